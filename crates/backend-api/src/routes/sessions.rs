use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use skillswap_database::Session;

use crate::{
    pagination::{PageQuery, Paginated, PaginatedSessions},
    routes::models::{CreateSessionRequest, SessionSearchQuery, UpdateSessionRequest},
    services::sessions as session_service,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/sessions",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created with the caller as host", body = Session),
        (status = 400, description = "Invalid session payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let session =
        session_service::create(state.db_pool(), state.keywords(), &user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/sessions",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Sessions the caller hosts or joined", body = [Session]))
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(session_service::list_mine(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/sessions/public",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Public upcoming sessions", body = [Session]))
)]
pub async fn public_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(session_service::list_public(state.db_pool()).await?))
}

#[utoipa::path(
    get,
    path = "/sessions/search",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    params(SessionSearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching sessions, soonest first", body = PaginatedSessions),
        (status = 400, description = "Unknown status filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionSearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<Session>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    let sessions = session_service::search(
        state.db_pool(),
        query.q.as_deref(),
        query.status.as_deref(),
        page,
    )
    .await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/sessions/upcoming",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "The caller's sessions in the next three days", body = [Session]))
)]
pub async fn upcoming_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(session_service::upcoming(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/sessions/suggested",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Public sessions matching the caller's skills", body = [Session]))
)]
pub async fn suggested_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(session_service::suggested(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session", body = Session),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(session_service::get(state.db_pool(), &id).await?))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Session identifier")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Updated session", body = Session),
        (status = 403, description = "Not the host", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let session =
        session_service::update(state.db_pool(), state.keywords(), &user.id, &id, payload).await?;
    Ok(Json(session))
}

#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 403, description = "Not the host", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    session_service::delete(state.db_pool(), &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/join",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Joined; the updated session", body = Session),
        (status = 400, description = "Host, existing participant, full or closed session", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn join_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(session_service::join(state.db_pool(), &user.id, &id).await?))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/leave",
    tag = "Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Left; the updated session", body = Session),
        (status = 400, description = "Caller is not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn leave_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(session_service::leave(state.db_pool(), &user.id, &id).await?))
}
