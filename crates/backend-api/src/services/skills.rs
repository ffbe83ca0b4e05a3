use std::sync::Arc;

use skillswap_database::{NewSkill, Skill, SkillRepository, SkillType, SkillUpdate, UserRepository};
use skillswap_integrations::KeywordClient;
use sqlx::SqlitePool;
use tracing::info;

use super::enrichment::spawn_skill_enrichment;
use super::error::{ServiceError, ServiceResult};
use crate::pagination::{PageQuery, Paginated};
use crate::routes::models::{CreateSkillRequest, SkillWithOwner, UpdateSkillRequest};
use crate::util::clean_list;


fn parse_skill_type(raw: &str) -> ServiceResult<SkillType> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|error: skillswap_database::InvalidEnumValue| {
            ServiceError::bad_request(error.to_string())
        })
}

fn check_proficiency(value: i64) -> ServiceResult<()> {
    if !(0..=100).contains(&value) {
        return Err(ServiceError::bad_request(
            "Proficiency must be between 0 and 100",
        ));
    }
    Ok(())
}

fn required(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::bad_request(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub async fn create(
    pool: &SqlitePool,
    keywords: Arc<KeywordClient>,
    user_id: &str,
    request: CreateSkillRequest,
) -> ServiceResult<Skill> {
    let name = required(&request.name, "Name")?;
    let category = required(&request.category, "Category")?;
    check_proficiency(request.proficiency)?;
    let skill_type = parse_skill_type(&request.skill_type)?;

    let skill = SkillRepository::new(pool.clone())
        .create(&NewSkill {
            user_id: user_id.to_string(),
            name,
            category,
            proficiency: request.proficiency,
            skill_type,
            description: request.description,
            experience: request.experience,
            goals: request.goals,
            agenda: clean_list(request.agenda),
        })
        .await?;

    info!(skill = %skill.id, user = %user_id, "skill created");
    spawn_skill_enrichment(pool.clone(), keywords, skill.clone());

    Ok(skill)
}

pub async fn list_mine(
    pool: &SqlitePool,
    user_id: &str,
    query: PageQuery,
) -> ServiceResult<Paginated<Skill>> {
    let skills = SkillRepository::new(pool.clone());
    let data = skills
        .list_by_user(user_id, query.limit(), query.offset())
        .await?;
    let total = skills.count_by_user(user_id).await?;
    Ok(Paginated::new(data, total, query))
}

pub async fn search(
    pool: &SqlitePool,
    query: Option<&str>,
    skill_type: Option<&str>,
    page: PageQuery,
) -> ServiceResult<Paginated<Skill>> {
    let query = query.map(str::trim).unwrap_or_default();
    let skill_type = skill_type.map(str::trim).filter(|value| !value.is_empty());

    if query.is_empty() && skill_type.is_none() {
        return Err(ServiceError::bad_request(
            "Either a search query or a skill type is required",
        ));
    }
    let skill_type = skill_type.map(parse_skill_type).transpose()?;

    let hits = SkillRepository::new(pool.clone())
        .search(query, skill_type, page.limit(), page.offset())
        .await?;
    Ok(Paginated::from_search(hits, page))
}

pub async fn get(pool: &SqlitePool, id: &str) -> ServiceResult<SkillWithOwner> {
    let skill = find(pool, id).await?;
    let owner = UserRepository::new(pool.clone())
        .find_by_id(&skill.user_id)
        .await?
        .map(|user| user.summary());
    Ok(SkillWithOwner { skill, owner })
}

pub async fn update(
    pool: &SqlitePool,
    keywords: Arc<KeywordClient>,
    user_id: &str,
    id: &str,
    request: UpdateSkillRequest,
) -> ServiceResult<Skill> {
    let existing = find(pool, id).await?;
    if existing.user_id != user_id {
        return Err(ServiceError::forbidden("You can only update your own skills"));
    }

    let name = request
        .name
        .as_deref()
        .map(|name| required(name, "Name"))
        .transpose()?;
    let category = request
        .category
        .as_deref()
        .map(|category| required(category, "Category"))
        .transpose()?;
    if let Some(proficiency) = request.proficiency {
        check_proficiency(proficiency)?;
    }
    let skill_type = request
        .skill_type
        .as_deref()
        .map(parse_skill_type)
        .transpose()?;
    let agenda = request.agenda.map(clean_list);

    let reenrich = name.as_ref().is_some_and(|name| *name != existing.name)
        || agenda.as_ref().is_some_and(|agenda| *agenda != existing.agenda);

    let skill = SkillRepository::new(pool.clone())
        .update(
            id,
            &SkillUpdate {
                name,
                category,
                proficiency: request.proficiency,
                skill_type,
                description: request.description,
                experience: request.experience,
                goals: request.goals,
                agenda,
            },
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("Skill not found"))?;

    if reenrich {
        spawn_skill_enrichment(pool.clone(), keywords, skill.clone());
    }

    Ok(skill)
}

pub async fn delete(pool: &SqlitePool, user_id: &str, id: &str) -> ServiceResult<()> {
    let existing = find(pool, id).await?;
    if existing.user_id != user_id {
        return Err(ServiceError::forbidden("You can only delete your own skills"));
    }
    SkillRepository::new(pool.clone()).delete(id).await?;
    info!(skill = %id, user = %user_id, "skill deleted");
    Ok(())
}

async fn find(pool: &SqlitePool, id: &str) -> ServiceResult<Skill> {
    SkillRepository::new(pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Skill not found"))
}
