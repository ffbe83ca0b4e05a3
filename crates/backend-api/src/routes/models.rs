//! Request and response bodies shared by the route handlers and services.

use serde::{Deserialize, Serialize};
use skillswap_database::{Skill, User, UserSummary};
use utoipa::{IntoParams, ToSchema};

const fn default_true() -> bool {
    true
}

const fn default_one() -> i64 {
    1
}

const fn default_two() -> i64 {
    2
}

// Auth

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_at: String,
    pub user: User,
    /// Token for the hosted chat SDK, null when chat is not configured.
    pub stream_chat_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub data: User,
}

// Users

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    /// One of `online`, `offline`, `busy`, `away`.
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// Skills

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub proficiency: i64,
    /// `teaching` or `learning`.
    pub skill_type: String,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub goals: Option<String>,
    #[serde(default)]
    pub agenda: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSkillRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<i64>,
    pub skill_type: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub goals: Option<String>,
    pub agenda: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SkillSearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub skill_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SkillWithOwner {
    #[serde(flatten)]
    pub skill: Skill,
    pub owner: Option<UserSummary>,
}

// Sessions

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub title: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub start_time: String,
    /// `HH:MM`, after `start_time`.
    pub end_time: String,
    pub skill_category: String,
    #[serde(default = "default_true")]
    pub is_teaching: bool,
    #[serde(default = "default_one")]
    pub max_participants: i64,
    #[serde(default = "default_true")]
    pub is_public: bool,
    pub teach_skill_id: Option<String>,
    pub teach_skill_name: Option<String>,
    #[serde(default)]
    pub sub_topics: Vec<String>,
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub focus_keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub skill_category: Option<String>,
    /// `upcoming`, `completed` or `cancelled`.
    pub status: Option<String>,
    pub is_teaching: Option<bool>,
    pub max_participants: Option<i64>,
    pub is_public: Option<bool>,
    pub teach_skill_name: Option<String>,
    pub sub_topics: Option<Vec<String>>,
    pub meeting_link: Option<String>,
    pub focus_keywords: Option<Vec<String>>,
}

/// Text query plus optional status filter, shared by both session searches.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SessionSearchQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

// Exchange requests

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExchangeRequestRequest {
    pub session_id: String,
    pub recipient_id: String,
    pub offered_skill_id: String,
    pub requested_skill_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateExchangeRequestStatus {
    /// `accepted`, `rejected` or `cancelled`.
    pub status: Option<String>,
}

// Exchange sessions

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExchangeSessionRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub skill_category: String,
    #[serde(default = "default_two")]
    pub max_participants: i64,
    #[serde(default)]
    pub is_public: bool,
    pub requested_by: String,
    pub skill_id: String,
    pub requested_skill_id: String,
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub focus_keywords: Vec<String>,
    #[serde(default)]
    pub requested_skill_focus_keywords: Vec<String>,
    #[serde(default)]
    pub session_agenda: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateExchangeSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub skill_category: Option<String>,
    /// `upcoming`, `ongoing`, `completed`, `cancelled` or `expired`.
    pub status: Option<String>,
    pub is_public: Option<bool>,
    pub meeting_link: Option<String>,
    pub focus_keywords: Option<Vec<String>>,
    pub session_agenda: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExchangeStats {
    pub completed_sessions: i64,
    pub scheduled_sessions: i64,
    pub unique_partners: i64,
}

// Notifications

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

// Messages

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateConversationRequest {
    pub participant_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
    /// `text`, `image` or `file`; defaults to `text`.
    pub message_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StreamTokenResponse {
    pub token: String,
    pub api_key: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChannelRequest {
    pub participant_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelResponse {
    pub channel_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StreamMessageRequest {
    pub content: String,
}

// Health

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub environment: String,
    pub version: String,
}
