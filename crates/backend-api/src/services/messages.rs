use serde_json::Value;
use skillswap_database::{Conversation, ConversationRepository, Message, MessageType, User, UserRepository};
use skillswap_integrations::{StreamChatClient, MESSAGING_CHANNEL};
use sqlx::SqlitePool;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::pagination::{PageQuery, Paginated};
use crate::routes::models::{ChannelResponse, StreamTokenResponse};

pub async fn list_conversations(
    pool: &SqlitePool,
    user_id: &str,
    query: PageQuery,
) -> ServiceResult<Paginated<Conversation>> {
    let conversations = ConversationRepository::new(pool.clone());
    let data = conversations
        .list_for_user(user_id, query.limit(), query.offset())
        .await?;
    let total = conversations.count_for_user(user_id).await?;
    Ok(Paginated::new(data, total, query))
}

/// Returns the two-party conversation between the caller and `participant_id`,
/// creating it on first contact.
pub async fn open_conversation(
    pool: &SqlitePool,
    user_id: &str,
    participant_id: &str,
) -> ServiceResult<Conversation> {
    let participant = participant_id.trim();
    if participant.is_empty() {
        return Err(ServiceError::bad_request("participant_id is required"));
    }
    if participant == user_id {
        return Err(ServiceError::bad_request(
            "You cannot start a conversation with yourself",
        ));
    }
    if UserRepository::new(pool.clone())
        .find_by_id(participant)
        .await?
        .is_none()
    {
        return Err(ServiceError::not_found("User not found"));
    }

    let (conversation, created) = ConversationRepository::new(pool.clone())
        .open_between(user_id, participant)
        .await?;
    if created {
        info!(conversation = %conversation.id, user = %user_id, participant = %participant, "conversation created");
    }
    Ok(conversation)
}

async fn participant_conversation(
    pool: &SqlitePool,
    user_id: &str,
    conversation_id: &str,
) -> ServiceResult<Conversation> {
    let conversation = ConversationRepository::new(pool.clone())
        .find_by_id(conversation_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Conversation not found"))?;
    if !conversation.has_participant(user_id) {
        return Err(ServiceError::forbidden(
            "You are not a participant of this conversation",
        ));
    }
    Ok(conversation)
}

/// One page of a conversation, oldest message first within the page.
pub async fn list_messages(
    pool: &SqlitePool,
    user_id: &str,
    conversation_id: &str,
    query: PageQuery,
) -> ServiceResult<Paginated<Message>> {
    participant_conversation(pool, user_id, conversation_id).await?;

    let conversations = ConversationRepository::new(pool.clone());
    let mut data = conversations
        .list_messages(conversation_id, query.limit(), query.offset())
        .await?;
    data.reverse();
    let total = conversations.count_messages(conversation_id).await?;
    Ok(Paginated::new(data, total, query))
}

pub async fn send_message(
    pool: &SqlitePool,
    user_id: &str,
    conversation_id: &str,
    content: &str,
    message_type: Option<&str>,
) -> ServiceResult<Message> {
    participant_conversation(pool, user_id, conversation_id).await?;

    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::bad_request("Message content is required"));
    }
    let message_type = match message_type.map(str::trim).filter(|kind| !kind.is_empty()) {
        Some(kind) => kind
            .to_lowercase()
            .parse()
            .map_err(|error: skillswap_database::InvalidEnumValue| {
                ServiceError::bad_request(error.to_string())
            })?,
        None => MessageType::Text,
    };

    let message = ConversationRepository::new(pool.clone())
        .insert_message(conversation_id, user_id, content, message_type)
        .await?;
    info!(conversation = %conversation_id, sender = %user_id, message = %message.id, "message sent");
    Ok(message)
}

fn require_chat(stream: Option<&StreamChatClient>) -> ServiceResult<&StreamChatClient> {
    stream.ok_or_else(|| ServiceError::unavailable("Chat service is not configured"))
}

/// Deterministic id of the one-to-one channel between two users.
pub fn direct_channel_id(first: &str, second: &str) -> String {
    let mut members = [first, second];
    members.sort_unstable();
    members.join("-")
}

pub fn stream_token(
    stream: Option<&StreamChatClient>,
    user: &User,
) -> ServiceResult<StreamTokenResponse> {
    let stream = require_chat(stream)?;
    Ok(StreamTokenResponse {
        token: stream.create_user_token(&user.id)?,
        api_key: stream.api_key().to_string(),
        user_id: user.id.clone(),
    })
}

pub async fn stream_channels(
    stream: Option<&StreamChatClient>,
    user_id: &str,
) -> ServiceResult<Vec<Value>> {
    Ok(require_chat(stream)?.query_channels(user_id).await?)
}

pub async fn open_stream_channel(
    pool: &SqlitePool,
    stream: Option<&StreamChatClient>,
    user_id: &str,
    participant_id: &str,
) -> ServiceResult<ChannelResponse> {
    let stream = require_chat(stream)?;
    let participant = participant_id.trim();
    if participant.is_empty() || participant == user_id {
        return Err(ServiceError::bad_request("A different participant is required"));
    }
    if UserRepository::new(pool.clone())
        .find_by_id(participant)
        .await?
        .is_none()
    {
        return Err(ServiceError::not_found("User not found"));
    }

    let channel_id = direct_channel_id(user_id, participant);
    stream
        .get_or_create_channel(MESSAGING_CHANNEL, &channel_id, &[user_id, participant], user_id)
        .await?;
    info!(channel = %channel_id, user = %user_id, "chat channel ready");
    Ok(ChannelResponse { channel_id })
}

pub async fn send_stream_message(
    stream: Option<&StreamChatClient>,
    user_id: &str,
    channel_id: &str,
    content: &str,
) -> ServiceResult<Value> {
    let stream = require_chat(stream)?;
    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::bad_request("Message content is required"));
    }
    Ok(stream
        .send_message(MESSAGING_CHANNEL, channel_id, user_id, content)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_channel_ids_ignore_argument_order() {
        assert_eq!(direct_channel_id("zed", "amy"), "amy-zed");
        assert_eq!(direct_channel_id("amy", "zed"), "amy-zed");
    }

    #[test]
    fn chat_routes_need_a_configured_client() {
        assert!(matches!(
            require_chat(None),
            Err(ServiceError::Unavailable(_))
        ));
    }
}
