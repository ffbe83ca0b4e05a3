use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use skillswap_database::{Conversation, Message};

use crate::{
    pagination::{PageQuery, Paginated, PaginatedConversations, PaginatedMessages},
    routes::models::{
        ChannelResponse, CreateChannelRequest, CreateConversationRequest, SendMessageRequest,
        StreamMessageRequest, StreamTokenResponse,
    },
    services::messages as message_service,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/messages/conversations",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(PageQuery),
    responses((status = 200, description = "Conversations, most recently active first", body = PaginatedConversations))
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Conversation>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        message_service::list_conversations(state.db_pool(), &user.id, query).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/messages/conversations",
    tag = "Messages",
    security(("bearerAuth" = [])),
    request_body = CreateConversationRequest,
    responses(
        (status = 200, description = "Existing or new two-party conversation", body = Conversation),
        (status = 400, description = "Participant is the caller", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown participant", body = crate::error::ErrorResponse)
    )
)]
pub async fn open_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateConversationRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let conversation =
        message_service::open_conversation(state.db_pool(), &user.id, &payload.participant_id)
            .await?;
    Ok(Json(conversation))
}

#[utoipa::path(
    get,
    path = "/messages/conversations/{id}/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(
        ("id" = String, Path, description = "Conversation identifier"),
        PageQuery
    ),
    responses(
        (status = 200, description = "A page of messages in chronological order", body = PaginatedMessages),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Conversation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Message>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        message_service::list_messages(state.db_pool(), &user.id, &id, query).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/messages/conversations/{id}/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Conversation identifier")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = Message),
        (status = 400, description = "Empty content or unknown message type", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not a participant", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let message = message_service::send_message(
        state.db_pool(),
        &user.id,
        &id,
        &payload.content,
        payload.message_type.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/messages/stream/token",
    tag = "Chat",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Chat SDK credentials for the caller", body = StreamTokenResponse),
        (status = 503, description = "Chat service not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn stream_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StreamTokenResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(message_service::stream_token(state.stream(), &user)?))
}

#[utoipa::path(
    get,
    path = "/messages/stream/channels",
    tag = "Chat",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "The caller's messaging channels"),
        (status = 503, description = "Chat service not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn stream_channels(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        message_service::stream_channels(state.stream(), &user.id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/messages/stream/channels",
    tag = "Chat",
    security(("bearerAuth" = [])),
    request_body = CreateChannelRequest,
    responses(
        (status = 200, description = "Channel ready", body = ChannelResponse),
        (status = 503, description = "Chat service not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_stream_channel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateChannelRequest>,
) -> Result<Json<ChannelResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let channel = message_service::open_stream_channel(
        state.db_pool(),
        state.stream(),
        &user.id,
        &payload.participant_id,
    )
    .await?;
    Ok(Json(channel))
}

#[utoipa::path(
    post,
    path = "/messages/stream/channels/{channel_id}/messages",
    tag = "Chat",
    security(("bearerAuth" = [])),
    params(("channel_id" = String, Path, description = "Messaging channel identifier")),
    request_body = StreamMessageRequest,
    responses(
        (status = 200, description = "Message accepted by the chat service"),
        (status = 503, description = "Chat service not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_stream_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(channel_id): Path<String>,
    Json(payload): Json<StreamMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let reply = message_service::send_stream_message(
        state.stream(),
        &user.id,
        &channel_id,
        &payload.content,
    )
    .await?;
    Ok(Json(reply))
}
