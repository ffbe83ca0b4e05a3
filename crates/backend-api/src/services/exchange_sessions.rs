use std::collections::HashSet;

use chrono::Local;
use skillswap_database::{
    ExchangeSession, ExchangeSessionRepository, ExchangeSessionStatus, ExchangeSessionUpdate,
    NewExchangeSession, SkillRepository, UserRepository,
};
use sqlx::SqlitePool;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use super::sessions::validate_schedule;
use crate::pagination::{PageQuery, Paginated};
use crate::routes::models::{
    CreateExchangeSessionRequest, ExchangeStats, UpdateExchangeSessionRequest,
};
use crate::util::{clean_list, local_date_window};

pub const UPCOMING_WINDOW_DAYS: u64 = 7;
pub const DASHBOARD_WINDOW_DAYS: u64 = 3;

fn parse_status(raw: &str) -> ServiceResult<ExchangeSessionStatus> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|error: skillswap_database::InvalidEnumValue| {
            ServiceError::bad_request(error.to_string())
        })
}

pub async fn create(
    pool: &SqlitePool,
    host_id: &str,
    request: CreateExchangeSessionRequest,
) -> ServiceResult<ExchangeSession> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ServiceError::bad_request("Title is required"));
    }
    validate_schedule(&request.date, &request.start_time, &request.end_time)?;
    if request.max_participants < 1 {
        return Err(ServiceError::bad_request(
            "Max participants must be at least 1",
        ));
    }

    let skills = SkillRepository::new(pool.clone());
    for skill_id in [&request.skill_id, &request.requested_skill_id] {
        if skills.find_by_id(skill_id).await?.is_none() {
            return Err(ServiceError::bad_request(format!(
                "Skill with ID {skill_id} not found"
            )));
        }
    }
    if UserRepository::new(pool.clone())
        .find_by_id(&request.requested_by)
        .await?
        .is_none()
    {
        return Err(ServiceError::bad_request(format!(
            "User with ID {} not found",
            request.requested_by
        )));
    }

    let session = ExchangeSessionRepository::new(pool.clone())
        .create(&NewExchangeSession {
            title: title.to_string(),
            description: request.description,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            skill_category: request.skill_category,
            max_participants: request.max_participants,
            is_public: request.is_public,
            host_id: host_id.to_string(),
            requested_by: request.requested_by,
            skill_id: request.skill_id,
            requested_skill_id: request.requested_skill_id,
            meeting_link: request.meeting_link,
            focus_keywords: clean_list(request.focus_keywords),
            requested_skill_focus_keywords: clean_list(request.requested_skill_focus_keywords),
            session_agenda: clean_list(request.session_agenda),
        })
        .await?;

    info!(
        exchange_session = %session.id,
        host = %host_id,
        partner = %session.requested_by,
        "exchange session scheduled"
    );
    Ok(session)
}

/// Completed and scheduled counts plus distinct partners across completed sessions.
pub fn summarize(sessions: &[ExchangeSession], user_id: &str) -> ExchangeStats {
    let completed: Vec<&ExchangeSession> = sessions
        .iter()
        .filter(|session| session.status == ExchangeSessionStatus::Completed)
        .collect();
    let partners: HashSet<&str> = completed
        .iter()
        .map(|session| session.partner_of(user_id))
        .collect();

    ExchangeStats {
        completed_sessions: completed.len() as i64,
        scheduled_sessions: sessions
            .iter()
            .filter(|session| session.status == ExchangeSessionStatus::Upcoming)
            .count() as i64,
        unique_partners: partners.len() as i64,
    }
}

pub async fn stats(pool: &SqlitePool, user_id: &str) -> ServiceResult<ExchangeStats> {
    let sessions = list_mine(pool, user_id).await?;
    Ok(summarize(&sessions, user_id))
}

pub async fn list_mine(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<ExchangeSession>> {
    Ok(ExchangeSessionRepository::new(pool.clone())
        .list_for_user(user_id)
        .await?)
}

pub async fn list_public(pool: &SqlitePool) -> ServiceResult<Vec<ExchangeSession>> {
    Ok(ExchangeSessionRepository::new(pool.clone())
        .list_public()
        .await?)
}

pub async fn search(
    pool: &SqlitePool,
    query: &str,
    status: Option<&str>,
    page: PageQuery,
) -> ServiceResult<Paginated<ExchangeSession>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::bad_request("Search query is required"));
    }
    let status = status
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_status)
        .transpose()?;
    let hits = ExchangeSessionRepository::new(pool.clone())
        .search(query, status, page.limit(), page.offset())
        .await?;
    Ok(Paginated::from_search(hits, page))
}

/// The caller's upcoming sessions dated within the next `days` days.
pub async fn upcoming(
    pool: &SqlitePool,
    user_id: &str,
    days: u64,
) -> ServiceResult<Vec<ExchangeSession>> {
    let (from, to) = local_date_window(days);
    Ok(ExchangeSessionRepository::new(pool.clone())
        .upcoming_for_user(user_id, &from, &to)
        .await?)
}

pub async fn by_skills(
    pool: &SqlitePool,
    skill_id: &str,
    requested_skill_id: &str,
) -> ServiceResult<Vec<ExchangeSession>> {
    Ok(ExchangeSessionRepository::new(pool.clone())
        .list_by_skill_pair(skill_id, requested_skill_id)
        .await?)
}

pub async fn get(pool: &SqlitePool, id: &str) -> ServiceResult<ExchangeSession> {
    ExchangeSessionRepository::new(pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Exchange session not found"))
}

pub async fn update(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    request: UpdateExchangeSessionRequest,
) -> ServiceResult<ExchangeSession> {
    let existing = get(pool, id).await?;
    if !existing.involves(user_id) {
        return Err(ServiceError::forbidden(
            "Only the host or the requesting user can update this session",
        ));
    }

    if request.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(ServiceError::bad_request("Title cannot be empty"));
    }
    validate_schedule(
        request.date.as_deref().unwrap_or(&existing.date),
        request.start_time.as_deref().unwrap_or(&existing.start_time),
        request.end_time.as_deref().unwrap_or(&existing.end_time),
    )?;
    let status = request.status.as_deref().map(parse_status).transpose()?;

    let session = ExchangeSessionRepository::new(pool.clone())
        .update(
            id,
            &ExchangeSessionUpdate {
                title: request.title.map(|title| title.trim().to_string()),
                description: request.description,
                date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
                skill_category: request.skill_category,
                status,
                is_public: request.is_public,
                meeting_link: request.meeting_link,
                focus_keywords: request.focus_keywords.map(clean_list),
                session_agenda: request.session_agenda.map(clean_list),
            },
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("Exchange session not found"))?;

    if let Some(status) = status {
        info!(exchange_session = %id, %status, user = %user_id, "exchange session status changed");
    }
    Ok(session)
}

pub async fn delete(pool: &SqlitePool, user_id: &str, id: &str) -> ServiceResult<()> {
    let existing = get(pool, id).await?;
    if !existing.involves(user_id) {
        return Err(ServiceError::forbidden(
            "Only the host or the requesting user can delete this session",
        ));
    }
    ExchangeSessionRepository::new(pool.clone()).delete(id).await?;
    info!(exchange_session = %id, user = %user_id, "exchange session deleted");
    Ok(())
}

/// Marks every upcoming session whose start has passed as expired.
pub async fn expire_overdue(pool: &SqlitePool) -> ServiceResult<u64> {
    let now = Local::now();
    let expired = ExchangeSessionRepository::new(pool.clone())
        .expire_overdue(
            &now.format("%Y-%m-%d").to_string(),
            &now.format("%H:%M").to_string(),
        )
        .await?;
    if expired > 0 {
        info!(count = expired, "expired overdue exchange sessions");
    }
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(host: &str, partner: &str, status: ExchangeSessionStatus) -> ExchangeSession {
        ExchangeSession {
            id: format!("{host}-{partner}"),
            title: "Swap".into(),
            description: None,
            date: "2030-01-01".into(),
            start_time: "10:00".into(),
            end_time: "11:00".into(),
            skill_category: "Music".into(),
            status,
            max_participants: 2,
            is_public: false,
            host_id: host.into(),
            requested_by: partner.into(),
            skill_id: "k1".into(),
            requested_skill_id: "k2".into(),
            meeting_link: None,
            focus_keywords: Vec::new(),
            requested_skill_focus_keywords: Vec::new(),
            session_agenda: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn summary_counts_partners_from_either_side() {
        let sessions = vec![
            session("me", "bob", ExchangeSessionStatus::Completed),
            session("carol", "me", ExchangeSessionStatus::Completed),
            session("me", "bob", ExchangeSessionStatus::Completed),
            session("me", "dave", ExchangeSessionStatus::Upcoming),
            session("me", "erin", ExchangeSessionStatus::Cancelled),
        ];

        let stats = summarize(&sessions, "me");
        assert_eq!(
            stats,
            ExchangeStats {
                completed_sessions: 3,
                scheduled_sessions: 1,
                unique_partners: 2,
            }
        );
    }

    #[test]
    fn status_parsing_accepts_expired() {
        assert_eq!(parse_status("Expired").unwrap(), ExchangeSessionStatus::Expired);
        assert!(parse_status("paused").is_err());
    }
}
