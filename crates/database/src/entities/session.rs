//! Learning session entity definitions

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, 24 hour clock.
    pub start_time: String,
    pub end_time: String,
    pub skill_category: String,
    pub status: SessionStatus,
    pub is_teaching: bool,
    pub max_participants: i64,
    pub is_public: bool,
    pub participants: Vec<String>,
    pub teach_skill_id: Option<String>,
    pub teach_skill_name: Option<String>,
    pub sub_topics: Vec<String>,
    pub meeting_link: Option<String>,
    pub focus_keywords: Vec<String>,
    pub metadata: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Session {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.host_id == user_id || self.is_participant(user_id)
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|participant| participant == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() as i64 >= self.max_participants
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Upcoming,
    Completed,
    Cancelled,
}

text_enum!(SessionStatus, "session status", {
    Upcoming => "upcoming",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone)]
pub struct NewSession {
    pub host_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub skill_category: String,
    pub is_teaching: bool,
    pub max_participants: i64,
    pub is_public: bool,
    pub teach_skill_id: Option<String>,
    pub teach_skill_name: Option<String>,
    pub sub_topics: Vec<String>,
    pub meeting_link: Option<String>,
    pub focus_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub skill_category: Option<String>,
    pub status: Option<SessionStatus>,
    pub is_teaching: Option<bool>,
    pub max_participants: Option<i64>,
    pub is_public: Option<bool>,
    pub teach_skill_name: Option<String>,
    pub sub_topics: Option<Vec<String>>,
    pub meeting_link: Option<String>,
    pub focus_keywords: Option<Vec<String>>,
}
