use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    routes::models::{HealthResponse, RootResponse, StatusResponse},
    AppState,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "API banner", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "SkillSwap API is running".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "Health",
    responses((status = 200, description = "Runtime status", body = StatusResponse))
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let settings = state.settings();
    Json(StatusResponse {
        status: "running".to_string(),
        uptime_seconds: settings.started_at.elapsed().as_secs(),
        environment: settings.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
