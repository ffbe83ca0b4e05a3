//! Exchange session repository.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::search::{SearchPage, SearchTerm};
use crate::entities::{
    decode_list, encode_list, new_id, parse_enum, timestamp_now, ExchangeSession,
    ExchangeSessionStatus, ExchangeSessionUpdate, NewExchangeSession,
};
use crate::types::{DatabaseError, DatabaseResult};

const EXCHANGE_SESSION_COLUMNS: &str = "id, title, description, date, start_time, end_time, \
     skill_category, status, max_participants, is_public, host_id, requested_by, skill_id, \
     requested_skill_id, meeting_link, focus_keywords, requested_skill_focus_keywords, \
     session_agenda, created_at, updated_at";

#[derive(Clone)]
pub struct ExchangeSessionRepository {
    pool: SqlitePool,
}

impl ExchangeSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, session: &NewExchangeSession) -> DatabaseResult<ExchangeSession> {
        let id = new_id();
        let now = timestamp_now();

        sqlx::query(
            "INSERT INTO exchange_sessions (id, title, description, date, start_time, end_time,
                                            skill_category, status, max_participants, is_public,
                                            host_id, requested_by, skill_id, requested_skill_id,
                                            meeting_link, focus_keywords,
                                            requested_skill_focus_keywords, session_agenda,
                                            created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'upcoming', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(&session.date)
        .bind(&session.start_time)
        .bind(&session.end_time)
        .bind(&session.skill_category)
        .bind(session.max_participants)
        .bind(session.is_public)
        .bind(&session.host_id)
        .bind(&session.requested_by)
        .bind(&session.skill_id)
        .bind(&session.requested_skill_id)
        .bind(&session.meeting_link)
        .bind(encode_list(&session.focus_keywords)?)
        .bind(encode_list(&session.requested_skill_focus_keywords)?)
        .bind(encode_list(&session.session_agenda)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("exchange session {id}")))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<ExchangeSession>> {
        let row = sqlx::query(&format!(
            "SELECT {EXCHANGE_SESSION_COLUMNS} FROM exchange_sessions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_exchange_session).transpose()
    }

    /// Sessions the user hosts or requested, in calendar order.
    pub async fn list_for_user(&self, user_id: &str) -> DatabaseResult<Vec<ExchangeSession>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXCHANGE_SESSION_COLUMNS} FROM exchange_sessions
             WHERE host_id = ?1 OR requested_by = ?1
             ORDER BY date ASC, start_time ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_exchange_session).collect()
    }

    pub async fn list_public(&self) -> DatabaseResult<Vec<ExchangeSession>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXCHANGE_SESSION_COLUMNS} FROM exchange_sessions
             WHERE is_public = 1 AND status = 'upcoming'
             ORDER BY date ASC, start_time ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_exchange_session).collect()
    }

    pub async fn search(
        &self,
        query: &str,
        status: Option<ExchangeSessionStatus>,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<SearchPage<ExchangeSession>> {
        let term = SearchTerm::new(query);
        let rows = sqlx::query(&format!(
            "SELECT {EXCHANGE_SESSION_COLUMNS} FROM exchange_sessions
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY date ASC, start_time ASC"
        ))
        .bind(status.map(|value| value.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::new();
        for row in &rows {
            let session = map_exchange_session(row)?;
            let fields = [
                session.title.as_str(),
                session.description.as_deref().unwrap_or_default(),
                session.skill_category.as_str(),
            ];
            if term.matches_any(fields) {
                hits.push(session);
            }
        }
        Ok(SearchPage::from_hits(hits, limit, offset))
    }

    /// Upcoming sessions of a user dated within `[from, to]`.
    pub async fn upcoming_for_user(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> DatabaseResult<Vec<ExchangeSession>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXCHANGE_SESSION_COLUMNS} FROM exchange_sessions
             WHERE (host_id = ?1 OR requested_by = ?1)
               AND status = 'upcoming'
               AND date >= ?2 AND date <= ?3
             ORDER BY date ASC, start_time ASC"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_exchange_session).collect()
    }

    /// Sessions pairing the two skills, in either direction.
    pub async fn list_by_skill_pair(
        &self,
        skill_id: &str,
        requested_skill_id: &str,
    ) -> DatabaseResult<Vec<ExchangeSession>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXCHANGE_SESSION_COLUMNS} FROM exchange_sessions
             WHERE (skill_id = ?1 AND requested_skill_id = ?2)
                OR (skill_id = ?2 AND requested_skill_id = ?1)
             ORDER BY date ASC, start_time ASC"
        ))
        .bind(skill_id)
        .bind(requested_skill_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_exchange_session).collect()
    }

    pub async fn update(
        &self,
        id: &str,
        update: &ExchangeSessionUpdate,
    ) -> DatabaseResult<Option<ExchangeSession>> {
        let focus_keywords = update
            .focus_keywords
            .as_deref()
            .map(encode_list)
            .transpose()?;
        let session_agenda = update
            .session_agenda
            .as_deref()
            .map(encode_list)
            .transpose()?;

        let result = sqlx::query(
            "UPDATE exchange_sessions SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                date = COALESCE(?, date),
                start_time = COALESCE(?, start_time),
                end_time = COALESCE(?, end_time),
                skill_category = COALESCE(?, skill_category),
                status = COALESCE(?, status),
                is_public = COALESCE(?, is_public),
                meeting_link = COALESCE(?, meeting_link),
                focus_keywords = COALESCE(?, focus_keywords),
                session_agenda = COALESCE(?, session_agenda),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.date)
        .bind(&update.start_time)
        .bind(&update.end_time)
        .bind(&update.skill_category)
        .bind(update.status.map(|value| value.as_str()))
        .bind(update.is_public)
        .bind(&update.meeting_link)
        .bind(focus_keywords)
        .bind(session_agenda)
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM exchange_sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks upcoming sessions whose start has passed as expired.
    ///
    /// `today` is `YYYY-MM-DD` and `now` is `HH:MM`, both in server local time.
    pub async fn expire_overdue(&self, today: &str, now: &str) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE exchange_sessions SET status = 'expired', updated_at = ?1
             WHERE status = 'upcoming'
               AND (date < ?2 OR (date = ?2 AND start_time < ?3))",
        )
        .bind(timestamp_now())
        .bind(today)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn map_exchange_session(row: &SqliteRow) -> DatabaseResult<ExchangeSession> {
    let status: String = row.try_get("status")?;
    let focus_keywords: String = row.try_get("focus_keywords")?;
    let requested_focus: String = row.try_get("requested_skill_focus_keywords")?;
    let agenda: String = row.try_get("session_agenda")?;

    Ok(ExchangeSession {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        skill_category: row.try_get("skill_category")?,
        status: parse_enum("status", &status)?,
        max_participants: row.try_get("max_participants")?,
        is_public: row.try_get("is_public")?,
        host_id: row.try_get("host_id")?,
        requested_by: row.try_get("requested_by")?,
        skill_id: row.try_get("skill_id")?,
        requested_skill_id: row.try_get("requested_skill_id")?,
        meeting_link: row.try_get("meeting_link")?,
        focus_keywords: decode_list("focus_keywords", &focus_keywords)?,
        requested_skill_focus_keywords: decode_list(
            "requested_skill_focus_keywords",
            &requested_focus,
        )?,
        session_agenda: decode_list("session_agenda", &agenda)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
