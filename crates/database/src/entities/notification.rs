//! Notification entity definitions

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: Option<String>,
    pub title: String,
    pub message: String,
    /// Free-form kind such as `exchange_request_accepted`.
    pub notification_type: String,
    pub exchange_request_id: Option<String>,
    pub session_id: Option<String>,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: String,
    pub sender_id: Option<String>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub exchange_request_id: Option<String>,
    pub session_id: Option<String>,
}
