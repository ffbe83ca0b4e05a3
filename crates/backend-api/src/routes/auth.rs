use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use skillswap_auth::Registration;

use crate::{
    routes::models::{LoginRequest, LoginResponse, RegisterRequest, UserEnvelope},
    services::auth as auth_service,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserEnvelope),
        (status = 400, description = "Invalid registration payload", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    let registration = Registration {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        location: payload.location,
        bio: payload.bio,
        avatar: payload.avatar,
    };
    let user = auth_service::register(state.authenticator(), state.stream(), registration).await?;
    Ok((StatusCode::CREATED, Json(UserEnvelope { data: user })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = auth_service::login(
        state.authenticator(),
        state.stream(),
        &payload.email,
        &payload.password,
    )
    .await?;

    Ok(Json(LoginResponse {
        access_token: outcome.session.token,
        expires_at: outcome.session.expires_at.to_rfc3339(),
        user: outcome.user,
        stream_chat_token: outcome.chat_token,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserEnvelope>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(UserEnvelope { data: user }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    auth_service::logout(state.authenticator(), &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/auth/user/{user_id}",
    tag = "Auth",
    security(("bearerAuth" = [])),
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Chat service user record"),
        (status = 404, description = "Unknown chat user", body = crate::error::ErrorResponse),
        (status = 503, description = "Chat service not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn chat_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    let record = auth_service::chat_user(state.stream(), &user_id).await?;
    Ok(Json(record))
}
