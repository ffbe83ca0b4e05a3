use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use skillswap_database::ExchangeSession;

use crate::{
    pagination::{PageQuery, Paginated, PaginatedExchangeSessions},
    routes::models::{
        CreateExchangeSessionRequest, ExchangeStats, SessionSearchQuery,
        UpdateExchangeSessionRequest,
    },
    services::exchange_sessions::{self as exchange_service, DASHBOARD_WINDOW_DAYS, UPCOMING_WINDOW_DAYS},
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/exchange-sessions",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    request_body = CreateExchangeSessionRequest,
    responses(
        (status = 201, description = "Exchange session scheduled", body = ExchangeSession),
        (status = 400, description = "Invalid schedule, skill or partner", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_exchange_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateExchangeSessionRequest>,
) -> Result<(StatusCode, Json<ExchangeSession>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let session = exchange_service::create(state.db_pool(), &user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions/stats",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Exchange totals for the caller", body = ExchangeStats))
)]
pub async fn exchange_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ExchangeStats>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(exchange_service::stats(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "The caller's exchange sessions", body = [ExchangeSession]))
)]
pub async fn list_exchange_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExchangeSession>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(exchange_service::list_mine(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions/public",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Public upcoming exchange sessions", body = [ExchangeSession]))
)]
pub async fn public_exchange_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExchangeSession>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(exchange_service::list_public(state.db_pool()).await?))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions/search",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    params(SessionSearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching exchange sessions", body = PaginatedExchangeSessions),
        (status = 400, description = "Missing query or unknown status", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_exchange_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SessionSearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<ExchangeSession>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    let sessions = exchange_service::search(
        state.db_pool(),
        query.q.as_deref().unwrap_or_default(),
        query.status.as_deref(),
        page,
    )
    .await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions/upcoming",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Upcoming sessions in the next seven days", body = [ExchangeSession]))
)]
pub async fn upcoming_exchange_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExchangeSession>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        exchange_service::upcoming(state.db_pool(), &user.id, UPCOMING_WINDOW_DAYS).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions/upcoming-dashboard",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Upcoming sessions in the next three days", body = [ExchangeSession]))
)]
pub async fn dashboard_exchange_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExchangeSession>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        exchange_service::upcoming(state.db_pool(), &user.id, DASHBOARD_WINDOW_DAYS).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions/by-skills/{skill_id}/{requested_skill_id}",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    params(
        ("skill_id" = String, Path, description = "One skill of the pair"),
        ("requested_skill_id" = String, Path, description = "The other skill of the pair")
    ),
    responses((status = 200, description = "Sessions pairing the two skills", body = [ExchangeSession]))
)]
pub async fn exchange_sessions_by_skills(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((skill_id, requested_skill_id)): Path<(String, String)>,
) -> Result<Json<Vec<ExchangeSession>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(
        exchange_service::by_skills(state.db_pool(), &skill_id, &requested_skill_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/exchange-sessions/{id}",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Exchange session identifier")),
    responses(
        (status = 200, description = "Exchange session", body = ExchangeSession),
        (status = 404, description = "Exchange session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_exchange_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ExchangeSession>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(exchange_service::get(state.db_pool(), &id).await?))
}

#[utoipa::path(
    put,
    path = "/exchange-sessions/{id}",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Exchange session identifier")),
    request_body = UpdateExchangeSessionRequest,
    responses(
        (status = 200, description = "Updated exchange session", body = ExchangeSession),
        (status = 403, description = "Caller is not part of the exchange", body = crate::error::ErrorResponse),
        (status = 404, description = "Exchange session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_exchange_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateExchangeSessionRequest>,
) -> Result<Json<ExchangeSession>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let session = exchange_service::update(state.db_pool(), &user.id, &id, payload).await?;
    Ok(Json(session))
}

#[utoipa::path(
    delete,
    path = "/exchange-sessions/{id}",
    tag = "Exchange Sessions",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Exchange session identifier")),
    responses(
        (status = 204, description = "Exchange session deleted"),
        (status = 403, description = "Caller is not part of the exchange", body = crate::error::ErrorResponse),
        (status = 404, description = "Exchange session not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_exchange_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    exchange_service::delete(state.db_pool(), &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
