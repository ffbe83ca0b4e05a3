use std::sync::Arc;

use skillswap_database::{
    JoinOutcome, NewSession, Session, SessionRepository, SessionStatus, SessionUpdate,
    SkillRepository,
};
use skillswap_integrations::KeywordClient;
use sqlx::SqlitePool;
use tracing::info;

use super::enrichment::spawn_session_enrichment;
use super::error::{ServiceError, ServiceResult};
use crate::pagination::{PageQuery, Paginated};
use crate::routes::models::{CreateSessionRequest, UpdateSessionRequest};
use crate::util::{clean_list, local_date_window, parse_date, parse_time};

pub const SUGGESTED_LIMIT: usize = 10;
pub const UPCOMING_WINDOW_DAYS: u64 = 3;

/// Checks a `YYYY-MM-DD` date and an `HH:MM` start/end pair.
pub(crate) fn validate_schedule(date: &str, start_time: &str, end_time: &str) -> ServiceResult<()> {
    if parse_date(date).is_none() {
        return Err(ServiceError::bad_request("Date must be formatted as YYYY-MM-DD"));
    }
    let (Some(start), Some(end)) = (parse_time(start_time), parse_time(end_time)) else {
        return Err(ServiceError::bad_request("Times must be formatted as HH:MM"));
    };
    if end <= start {
        return Err(ServiceError::bad_request("End time must be after start time"));
    }
    Ok(())
}

fn parse_status(raw: &str) -> ServiceResult<SessionStatus> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|error: skillswap_database::InvalidEnumValue| {
            ServiceError::bad_request(error.to_string())
        })
}

fn enrichment_topic(session: &Session) -> String {
    session
        .teach_skill_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(session.skill_category.as_str())
        .to_string()
}

fn enrich(pool: &SqlitePool, keywords: Arc<KeywordClient>, session: &Session) {
    spawn_session_enrichment(pool.clone(), keywords, session.clone(), enrichment_topic(session));
}

pub async fn create(
    pool: &SqlitePool,
    keywords: Arc<KeywordClient>,
    host_id: &str,
    request: CreateSessionRequest,
) -> ServiceResult<Session> {
    if request.title.trim().is_empty() {
        return Err(ServiceError::bad_request("Title is required"));
    }
    validate_schedule(&request.date, &request.start_time, &request.end_time)?;
    if request.max_participants < 1 {
        return Err(ServiceError::bad_request(
            "Max participants must be at least 1",
        ));
    }

    let mut teach_skill_name = request.teach_skill_name;
    if let Some(skill_id) = request.teach_skill_id.as_deref() {
        let skill = SkillRepository::new(pool.clone())
            .find_by_id(skill_id)
            .await?
            .ok_or_else(|| ServiceError::bad_request(format!("Skill with ID {skill_id} not found")))?;
        if skill.user_id != host_id {
            return Err(ServiceError::bad_request(
                "You can only teach one of your own skills",
            ));
        }
        if teach_skill_name.is_none() {
            teach_skill_name = Some(skill.name);
        }
    }

    let session = SessionRepository::new(pool.clone())
        .create(&NewSession {
            host_id: host_id.to_string(),
            title: request.title.trim().to_string(),
            description: request.description,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            skill_category: request.skill_category.trim().to_string(),
            is_teaching: request.is_teaching,
            max_participants: request.max_participants,
            is_public: request.is_public,
            teach_skill_id: request.teach_skill_id,
            teach_skill_name,
            sub_topics: clean_list(request.sub_topics),
            meeting_link: request.meeting_link,
            focus_keywords: clean_list(request.focus_keywords),
        })
        .await?;

    info!(session = %session.id, host = %host_id, "session created");
    enrich(pool, keywords, &session);
    Ok(session)
}

pub async fn list_mine(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<Session>> {
    Ok(SessionRepository::new(pool.clone())
        .list_for_member(user_id)
        .await?)
}

pub async fn list_public(pool: &SqlitePool) -> ServiceResult<Vec<Session>> {
    Ok(SessionRepository::new(pool.clone())
        .list_public_upcoming()
        .await?)
}

pub async fn search(
    pool: &SqlitePool,
    query: Option<&str>,
    status: Option<&str>,
    page: PageQuery,
) -> ServiceResult<Paginated<Session>> {
    let status = status
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_status)
        .transpose()?;
    let hits = SessionRepository::new(pool.clone())
        .search(query.unwrap_or_default(), status, page.limit(), page.offset())
        .await?;
    Ok(Paginated::from_search(hits, page))
}

pub async fn upcoming(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<Session>> {
    let (from, to) = local_date_window(UPCOMING_WINDOW_DAYS);
    Ok(SessionRepository::new(pool.clone())
        .upcoming_for_member(user_id, &from, &to)
        .await?)
}

/// Public upcoming sessions from other hosts matching the caller's skills.
pub async fn suggested(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<Session>> {
    let skills = SkillRepository::new(pool.clone()).all_by_user(user_id).await?;
    let interests: Vec<String> = skills
        .iter()
        .flat_map(|skill| std::iter::once(&skill.name).chain(skill.metadata.iter()))
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect();

    let candidates = SessionRepository::new(pool.clone())
        .list_public_upcoming()
        .await?
        .into_iter()
        .filter(|session| session.host_id != user_id);

    if interests.is_empty() {
        return Ok(candidates.take(SUGGESTED_LIMIT).collect());
    }

    Ok(candidates
        .filter(|session| matches_interests(session, &interests))
        .take(SUGGESTED_LIMIT)
        .collect())
}

fn matches_interests(session: &Session, interests: &[String]) -> bool {
    let mut haystack = vec![
        session.title.to_lowercase(),
        session.skill_category.to_lowercase(),
    ];
    if let Some(name) = &session.teach_skill_name {
        haystack.push(name.to_lowercase());
    }
    haystack.extend(session.focus_keywords.iter().map(|value| value.to_lowercase()));
    haystack.extend(session.metadata.iter().map(|value| value.to_lowercase()));

    interests
        .iter()
        .any(|keyword| haystack.iter().any(|field| field.contains(keyword.as_str())))
}

pub async fn get(pool: &SqlitePool, id: &str) -> ServiceResult<Session> {
    SessionRepository::new(pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session not found"))
}

pub async fn update(
    pool: &SqlitePool,
    keywords: Arc<KeywordClient>,
    user_id: &str,
    id: &str,
    request: UpdateSessionRequest,
) -> ServiceResult<Session> {
    let existing = get(pool, id).await?;
    if existing.host_id != user_id {
        return Err(ServiceError::forbidden("Only the host can update this session"));
    }

    if request.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(ServiceError::bad_request("Title cannot be empty"));
    }
    validate_schedule(
        request.date.as_deref().unwrap_or(&existing.date),
        request.start_time.as_deref().unwrap_or(&existing.start_time),
        request.end_time.as_deref().unwrap_or(&existing.end_time),
    )?;
    if let Some(max) = request.max_participants {
        if max < 1 {
            return Err(ServiceError::bad_request(
                "Max participants must be at least 1",
            ));
        }
    }
    let status = request.status.as_deref().map(parse_status).transpose()?;
    let focus_keywords = request.focus_keywords.map(clean_list);

    let session = SessionRepository::new(pool.clone())
        .update(
            id,
            &SessionUpdate {
                title: request.title.map(|title| title.trim().to_string()),
                description: request.description,
                date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
                skill_category: request.skill_category,
                status,
                is_teaching: request.is_teaching,
                max_participants: request.max_participants,
                is_public: request.is_public,
                teach_skill_name: request.teach_skill_name,
                sub_topics: request.sub_topics.map(clean_list),
                meeting_link: request.meeting_link,
                focus_keywords,
            },
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("Session not found"))?;

    let reenrich = session.teach_skill_name != existing.teach_skill_name
        || session.skill_category != existing.skill_category
        || session.focus_keywords != existing.focus_keywords;
    if reenrich {
        enrich(pool, keywords, &session);
    }
    Ok(session)
}

pub async fn delete(pool: &SqlitePool, user_id: &str, id: &str) -> ServiceResult<()> {
    let existing = get(pool, id).await?;
    if existing.host_id != user_id {
        return Err(ServiceError::forbidden("Only the host can delete this session"));
    }
    SessionRepository::new(pool.clone()).delete(id).await?;
    info!(session = %id, "session deleted");
    Ok(())
}

pub async fn join(pool: &SqlitePool, user_id: &str, id: &str) -> ServiceResult<Session> {
    let session = get(pool, id).await?;

    if session.host_id == user_id {
        return Err(ServiceError::bad_request("You cannot join your own session"));
    }
    if session.is_participant(user_id) {
        return Err(ServiceError::bad_request("You are already a participant"));
    }
    if session.is_full() {
        return Err(ServiceError::bad_request("Session is full"));
    }
    if session.status != SessionStatus::Upcoming {
        return Err(ServiceError::bad_request("Session is not open for joining"));
    }

    match SessionRepository::new(pool.clone())
        .add_participant(id, user_id)
        .await?
    {
        JoinOutcome::Joined => info!(session = %id, user = %user_id, "participant joined"),
        JoinOutcome::AlreadyParticipant => {
            return Err(ServiceError::bad_request("You are already a participant"))
        }
        JoinOutcome::Full => return Err(ServiceError::bad_request("Session is full")),
    }

    get(pool, id).await
}

pub async fn leave(pool: &SqlitePool, user_id: &str, id: &str) -> ServiceResult<Session> {
    get(pool, id).await?;

    let removed = SessionRepository::new(pool.clone())
        .remove_participant(id, user_id)
        .await?;
    if !removed {
        return Err(ServiceError::bad_request(
            "You are not a participant of this session",
        ));
    }

    info!(session = %id, user = %user_id, "participant left");
    get(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(title: &str, category: &str) -> Session {
        Session {
            id: "s1".into(),
            host_id: "host".into(),
            title: title.into(),
            description: None,
            date: "2025-03-01".into(),
            start_time: "10:00".into(),
            end_time: "11:00".into(),
            skill_category: category.into(),
            status: SessionStatus::Upcoming,
            is_teaching: true,
            max_participants: 1,
            is_public: true,
            participants: Vec::new(),
            teach_skill_id: None,
            teach_skill_name: None,
            sub_topics: Vec::new(),
            meeting_link: None,
            focus_keywords: vec!["Borrow Checker".into()],
            metadata: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn schedule_validation() {
        assert!(validate_schedule("2025-03-01", "10:00", "11:00").is_ok());
        assert!(validate_schedule("03/01/2025", "10:00", "11:00").is_err());
        assert!(validate_schedule("2025-03-01", "10", "11:00").is_err());
        assert!(validate_schedule("2025-03-01", "11:00", "11:00").is_err());
        assert!(validate_schedule("2025-03-01", "12:00", "11:00").is_err());
    }

    #[test]
    fn interests_match_title_category_and_keywords() {
        let rust = session("Intro to Rust", "Programming");
        assert!(matches_interests(&rust, &["rust".into()]));
        assert!(matches_interests(&rust, &["programming".into()]));
        assert!(matches_interests(&rust, &["borrow".into()]));
        assert!(!matches_interests(&rust, &["guitar".into()]));
    }

    #[test]
    fn enrichment_topic_prefers_the_taught_skill() {
        let mut value = session("Intro", "Programming");
        assert_eq!(enrichment_topic(&value), "Programming");
        value.teach_skill_name = Some("Rust".into());
        assert_eq!(enrichment_topic(&value), "Rust");
    }
}
