use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use skillswap_database::Skill;

use crate::{
    pagination::{PageQuery, Paginated, PaginatedSkills},
    routes::models::{CreateSkillRequest, SkillSearchQuery, SkillWithOwner, UpdateSkillRequest},
    services::skills as skill_service,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/skills",
    tag = "Skills",
    security(("bearerAuth" = [])),
    request_body = CreateSkillRequest,
    responses(
        (status = 201, description = "Skill created; keywords are filled in asynchronously", body = Skill),
        (status = 400, description = "Invalid skill payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_skill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let skill =
        skill_service::create(state.db_pool(), state.keywords(), &user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

#[utoipa::path(
    get,
    path = "/skills",
    tag = "Skills",
    security(("bearerAuth" = [])),
    params(PageQuery),
    responses((status = 200, description = "The caller's skills", body = PaginatedSkills))
)]
pub async fn list_skills(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Skill>>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    Ok(Json(
        skill_service::list_mine(state.db_pool(), &user.id, query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/skills/search",
    tag = "Skills",
    security(("bearerAuth" = [])),
    params(SkillSearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching skills", body = PaginatedSkills),
        (status = 400, description = "Neither query nor type given", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_skills(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SkillSearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<Skill>>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    let skills = skill_service::search(
        state.db_pool(),
        query.q.as_deref(),
        query.skill_type.as_deref(),
        page,
    )
    .await?;
    Ok(Json(skills))
}

#[utoipa::path(
    get,
    path = "/skills/{id}",
    tag = "Skills",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Skill identifier")),
    responses(
        (status = 200, description = "Skill with its owner", body = SkillWithOwner),
        (status = 404, description = "Skill not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_skill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SkillWithOwner>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticate(&token).await?;
    Ok(Json(skill_service::get(state.db_pool(), &id).await?))
}

#[utoipa::path(
    put,
    path = "/skills/{id}",
    tag = "Skills",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Skill identifier")),
    request_body = UpdateSkillRequest,
    responses(
        (status = 200, description = "Updated skill", body = Skill),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Skill not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_skill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSkillRequest>,
) -> Result<Json<Skill>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let skill =
        skill_service::update(state.db_pool(), state.keywords(), &user.id, &id, payload).await?;
    Ok(Json(skill))
}

#[utoipa::path(
    delete,
    path = "/skills/{id}",
    tag = "Skills",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Skill identifier")),
    responses(
        (status = 204, description = "Skill deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Skill not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_skill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    skill_service::delete(state.db_pool(), &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
