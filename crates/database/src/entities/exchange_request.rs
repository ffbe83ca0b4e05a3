//! Exchange request entity definitions

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum;

/// A proposal to swap skills around a session, with display names joined in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRequest {
    pub id: String,
    pub session_id: String,
    pub session_title: Option<String>,
    pub requester_id: String,
    pub requester_name: Option<String>,
    pub recipient_id: String,
    pub recipient_name: Option<String>,
    pub offered_skill_id: String,
    pub offered_skill_name: Option<String>,
    pub requested_skill_id: String,
    pub requested_skill_name: Option<String>,
    pub message: Option<String>,
    pub status: ExchangeRequestStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeRequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

text_enum!(ExchangeRequestStatus, "exchange request status", {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone)]
pub struct NewExchangeRequest {
    pub session_id: String,
    pub requester_id: String,
    pub recipient_id: String,
    pub offered_skill_id: String,
    pub requested_skill_id: String,
    pub message: Option<String>,
}
