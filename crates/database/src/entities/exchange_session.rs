//! Exchange session entity definitions

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeSession {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub skill_category: String,
    pub status: ExchangeSessionStatus,
    pub max_participants: i64,
    pub is_public: bool,
    pub host_id: String,
    pub requested_by: String,
    pub skill_id: String,
    pub requested_skill_id: String,
    pub meeting_link: Option<String>,
    pub focus_keywords: Vec<String>,
    pub requested_skill_focus_keywords: Vec<String>,
    pub session_agenda: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ExchangeSession {
    pub fn involves(&self, user_id: &str) -> bool {
        self.host_id == user_id || self.requested_by == user_id
    }

    /// The other side of the exchange from `user_id`'s point of view.
    pub fn partner_of(&self, user_id: &str) -> &str {
        if self.host_id == user_id {
            &self.requested_by
        } else {
            &self.host_id
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeSessionStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
    Expired,
}

text_enum!(ExchangeSessionStatus, "exchange session status", {
    Upcoming => "upcoming",
    Ongoing => "ongoing",
    Completed => "completed",
    Cancelled => "cancelled",
    Expired => "expired",
});

#[derive(Debug, Clone)]
pub struct NewExchangeSession {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub skill_category: String,
    pub max_participants: i64,
    pub is_public: bool,
    pub host_id: String,
    pub requested_by: String,
    pub skill_id: String,
    pub requested_skill_id: String,
    pub meeting_link: Option<String>,
    pub focus_keywords: Vec<String>,
    pub requested_skill_focus_keywords: Vec<String>,
    pub session_agenda: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExchangeSessionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub skill_category: Option<String>,
    pub status: Option<ExchangeSessionStatus>,
    pub is_public: Option<bool>,
    pub meeting_link: Option<String>,
    pub focus_keywords: Option<Vec<String>>,
    pub session_agenda: Option<Vec<String>>,
}
