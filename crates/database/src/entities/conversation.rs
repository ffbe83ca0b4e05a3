//! Conversation and direct message entities

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{text_enum, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Conversation {
    pub id: String,
    pub participants: Vec<UserSummary>,
    pub last_message: Option<Message>,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|participant| participant.id == user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
}

text_enum!(MessageType, "message type", {
    Text => "text",
    Image => "image",
    File => "file",
});
