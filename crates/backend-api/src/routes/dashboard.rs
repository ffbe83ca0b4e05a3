use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    services::dashboard::{self as dashboard_service, DashboardData},
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/dashboard/data",
    tag = "Dashboard",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Dashboard aggregates for the caller", body = DashboardData),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn dashboard_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardData>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(dashboard_service::load(state.db_pool(), user).await?))
}
