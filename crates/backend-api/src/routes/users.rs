use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use skillswap_database::User;

use crate::{
    pagination::{PageQuery, Paginated, PaginatedUsers},
    routes::models::{SearchQuery, UpdateProfileRequest, UserEnvelope},
    services::users::{self as user_service, ProfileEdit, UserStatsResponse},
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Users, newest first", body = PaginatedUsers),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(user_service::list(state.db_pool(), query).await?))
}

#[utoipa::path(
    get,
    path = "/users/search",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching users", body = PaginatedUsers),
        (status = 400, description = "Missing query", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    let users =
        user_service::search(state.db_pool(), query.q.as_deref().unwrap_or_default(), page)
            .await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserEnvelope),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserEnvelope>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(UserEnvelope { data: user }))
}

#[utoipa::path(
    put,
    path = "/users/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserEnvelope),
        (status = 400, description = "Invalid profile payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let edit = ProfileEdit {
        name: payload.name,
        bio: payload.bio,
        location: payload.location,
        avatar: payload.avatar,
        status: payload.status,
    };
    let updated = user_service::update_profile(state.db_pool(), &user.id, edit).await?;
    Ok(Json(UserEnvelope { data: updated }))
}

#[utoipa::path(
    get,
    path = "/users/suggested",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Other members to connect with", body = [User]))
)]
pub async fn suggested_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(user_service::suggested(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User record", body = UserEnvelope),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    let user = user_service::get(state.db_pool(), &id).await?;
    Ok(Json(UserEnvelope { data: user }))
}

#[utoipa::path(
    get,
    path = "/users/{id}/stats",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Session statistics", body = UserStatsResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn user_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<UserStatsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(user_service::stats(state.db_pool(), &id).await?))
}
