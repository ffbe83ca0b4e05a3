use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use skillswap_database::Notification;

use crate::{
    routes::models::{MarkAllReadResponse, UnreadCountResponse},
    services::notifications as notification_service,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "The caller's notifications, newest first", body = [Notification]))
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(notification_service::list(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/notifications/unread",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Unread notifications", body = [Notification]))
)]
pub async fn get_unread_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        notification_service::list_unread(state.db_pool(), &user.id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Number of unread notifications", body = UnreadCountResponse))
)]
pub async fn get_unread_count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let count = notification_service::unread_count(state.db_pool(), &user.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        notification_service::mark_read(state.db_pool(), &user.id, &id).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/notifications/mark-all-read",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Number of notifications marked", body = MarkAllReadResponse))
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let updated = notification_service::mark_all_read(state.db_pool(), &user.id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Notification not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    notification_service::delete(state.db_pool(), &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
