use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use skillswap_database::ExchangeRequest;

use crate::{
    routes::models::{CreateExchangeRequestRequest, UpdateExchangeRequestStatus},
    services::exchange_requests as request_service,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/exchange-requests",
    tag = "Exchange Requests",
    security(("bearerAuth" = [])),
    request_body = CreateExchangeRequestRequest,
    responses(
        (status = 201, description = "Pending request created", body = ExchangeRequest),
        (status = 400, description = "Request addressed to the caller", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown session, skill or recipient", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateExchangeRequestRequest>,
) -> Result<(StatusCode, Json<ExchangeRequest>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let request = request_service::create(state.db_pool(), &user, payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/exchange-requests",
    tag = "Exchange Requests",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Requests sent or received by the caller", body = [ExchangeRequest]))
)]
pub async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(request_service::list_mine(state.db_pool(), &user.id).await?))
}

#[utoipa::path(
    get,
    path = "/exchange-requests/hosted-sessions",
    tag = "Exchange Requests",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Requests on sessions the caller hosts", body = [ExchangeRequest]))
)]
pub async fn hosted_session_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        request_service::list_for_hosted_sessions(state.db_pool(), &user.id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/exchange-requests/all",
    tag = "Exchange Requests",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Every exchange request", body = [ExchangeRequest]))
)]
pub async fn all_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(request_service::list_all(state.db_pool()).await?))
}

#[utoipa::path(
    get,
    path = "/exchange-requests/session/{session_id}",
    tag = "Exchange Requests",
    security(("bearerAuth" = [])),
    params(("session_id" = String, Path, description = "Session identifier")),
    responses((status = 200, description = "Requests attached to the session", body = [ExchangeRequest]))
)]
pub async fn session_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(
        request_service::list_by_session(state.db_pool(), &session_id).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/exchange-requests/{id}",
    tag = "Exchange Requests",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Exchange request identifier")),
    request_body = UpdateExchangeRequestStatus,
    responses(
        (status = 200, description = "Request moved to its new status", body = ExchangeRequest),
        (status = 400, description = "Missing status or request no longer pending", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller may not make this transition", body = crate::error::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateExchangeRequestStatus>,
) -> Result<Json<ExchangeRequest>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let request = request_service::update_status(
        state.db_pool(),
        &user.id,
        &id,
        payload.status.as_deref(),
    )
    .await?;
    Ok(Json(request))
}
