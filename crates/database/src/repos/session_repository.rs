//! Learning session repository, including participant bookkeeping.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::search::{SearchPage, SearchTerm};
use crate::entities::{
    decode_list, encode_list, new_id, parse_enum, timestamp_now, NewSession, Session,
    SessionStatus, SessionUpdate,
};
use crate::types::{DatabaseError, DatabaseResult};

const SESSION_SELECT: &str = "SELECT s.id, s.host_id, s.title, s.description, s.date, s.start_time, \
     s.end_time, s.skill_category, s.status, s.is_teaching, s.max_participants, s.is_public, \
     s.teach_skill_id, s.teach_skill_name, s.sub_topics, s.meeting_link, s.focus_keywords, \
     s.metadata, s.created_at, s.updated_at, \
     (SELECT json_group_array(sp.user_id) FROM session_participants sp WHERE sp.session_id = s.id) \
        AS participants \
     FROM sessions s";

/// Outcome of an attempt to add a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyParticipant,
    Full,
}

#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, session: &NewSession) -> DatabaseResult<Session> {
        let id = new_id();
        let now = timestamp_now();

        sqlx::query(
            "INSERT INTO sessions (id, host_id, title, description, date, start_time, end_time,
                                   skill_category, status, is_teaching, max_participants, is_public,
                                   teach_skill_id, teach_skill_name, sub_topics, meeting_link,
                                   focus_keywords, metadata, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'upcoming', ?, ?, ?, ?, ?, ?, ?, ?, '[]', ?, ?)",
        )
        .bind(&id)
        .bind(&session.host_id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(&session.date)
        .bind(&session.start_time)
        .bind(&session.end_time)
        .bind(&session.skill_category)
        .bind(session.is_teaching)
        .bind(session.max_participants)
        .bind(session.is_public)
        .bind(&session.teach_skill_id)
        .bind(&session.teach_skill_name)
        .bind(encode_list(&session.sub_topics)?)
        .bind(&session.meeting_link)
        .bind(encode_list(&session.focus_keywords)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("session {id}")))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Session>> {
        let row = sqlx::query(&format!("{SESSION_SELECT} WHERE s.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_session).transpose()
    }

    /// Sessions the user hosts or has joined, newest first.
    pub async fn list_for_member(&self, user_id: &str) -> DatabaseResult<Vec<Session>> {
        let rows = sqlx::query(&format!(
            "{SESSION_SELECT}
             WHERE s.host_id = ?1
                OR EXISTS (SELECT 1 FROM session_participants sp
                           WHERE sp.session_id = s.id AND sp.user_id = ?1)
             ORDER BY s.created_at DESC, s.rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_session).collect()
    }

    /// Public sessions still open, soonest first.
    pub async fn list_public_upcoming(&self) -> DatabaseResult<Vec<Session>> {
        let rows = sqlx::query(&format!(
            "{SESSION_SELECT}
             WHERE s.is_public = 1 AND s.status = 'upcoming'
             ORDER BY s.date ASC, s.start_time ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_session).collect()
    }

    /// Matches title, description, category or taught skill name, soonest first.
    pub async fn search(
        &self,
        query: &str,
        status: Option<SessionStatus>,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<SearchPage<Session>> {
        let term = SearchTerm::new(query);
        let rows = sqlx::query(&format!(
            "{SESSION_SELECT}
             WHERE ?1 IS NULL OR s.status = ?1
             ORDER BY s.date ASC, s.start_time ASC"
        ))
        .bind(status.map(|value| value.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::new();
        for row in &rows {
            let session = map_session(row)?;
            let fields = [
                session.title.as_str(),
                session.description.as_deref().unwrap_or_default(),
                session.skill_category.as_str(),
                session.teach_skill_name.as_deref().unwrap_or_default(),
            ];
            if term.matches_any(fields) {
                hits.push(session);
            }
        }
        Ok(SearchPage::from_hits(hits, limit, offset))
    }

    /// Upcoming sessions of a member dated within `[from, to]` (inclusive, `YYYY-MM-DD`).
    pub async fn upcoming_for_member(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> DatabaseResult<Vec<Session>> {
        let rows = sqlx::query(&format!(
            "{SESSION_SELECT}
             WHERE s.status = 'upcoming'
               AND s.date >= ?2 AND s.date <= ?3
               AND (s.host_id = ?1
                    OR EXISTS (SELECT 1 FROM session_participants sp
                               WHERE sp.session_id = s.id AND sp.user_id = ?1))
             ORDER BY s.date ASC, s.start_time ASC"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_session).collect()
    }

    pub async fn update(
        &self,
        id: &str,
        update: &SessionUpdate,
    ) -> DatabaseResult<Option<Session>> {
        let sub_topics = update.sub_topics.as_deref().map(encode_list).transpose()?;
        let focus_keywords = update
            .focus_keywords
            .as_deref()
            .map(encode_list)
            .transpose()?;

        let result = sqlx::query(
            "UPDATE sessions SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                date = COALESCE(?, date),
                start_time = COALESCE(?, start_time),
                end_time = COALESCE(?, end_time),
                skill_category = COALESCE(?, skill_category),
                status = COALESCE(?, status),
                is_teaching = COALESCE(?, is_teaching),
                max_participants = COALESCE(?, max_participants),
                is_public = COALESCE(?, is_public),
                teach_skill_name = COALESCE(?, teach_skill_name),
                sub_topics = COALESCE(?, sub_topics),
                meeting_link = COALESCE(?, meeting_link),
                focus_keywords = COALESCE(?, focus_keywords),
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
        .bind(update.is_teaching)
        .bind(update.max_participants)
        .bind(update.is_public)
        .bind(&update.teach_skill_name)
        .bind(sub_topics)
        .bind(&update.meeting_link)
        .bind(focus_keywords)
        .bind(timestamp_now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Stores keyword metadata computed from `source`, unless the session was
    /// deleted or its taught skill, category or focus keywords changed since.
    pub async fn set_metadata_if_current(
        &self,
        source: &Session,
        metadata: &[String],
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET metadata = ?, updated_at = ?
             WHERE id = ?
               AND teach_skill_name IS ?
               AND skill_category = ?
               AND focus_keywords = ?",
        )
        .bind(encode_list(metadata)?)
        .bind(timestamp_now())
        .bind(&source.id)
        .bind(&source.teach_skill_name)
        .bind(&source.skill_category)
        .bind(encode_list(&source.focus_keywords)?)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Adds a participant unless the session is already at capacity.
    ///
    /// The capacity check and the insert run as a single statement so
    /// concurrent joins cannot overfill a session.
    pub async fn add_participant(&self, id: &str, user_id: &str) -> DatabaseResult<JoinOutcome> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO session_participants (session_id, user_id, joined_at)
             SELECT ?1, ?2, ?3
             WHERE (SELECT COUNT(*) FROM session_participants WHERE session_id = ?1)
                   < (SELECT max_participants FROM sessions WHERE id = ?1)",
        )
        .bind(id)
        .bind(user_id)
        .bind(timestamp_now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            self.touch(id).await?;
            return Ok(JoinOutcome::Joined);
        }

        let already: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM session_participants WHERE session_id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(if already.is_some() {
            JoinOutcome::AlreadyParticipant
        } else {
            JoinOutcome::Full
        })
    }

    pub async fn remove_participant(&self, id: &str, user_id: &str) -> DatabaseResult<bool> {
        let result =
            sqlx::query("DELETE FROM session_participants WHERE session_id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() > 0 {
            self.touch(id).await?;
        }
        Ok(result.rows_affected() > 0)
    }

    async fn touch(&self, id: &str) -> DatabaseResult<()> {
        sqlx::query("UPDATE sessions SET updated_at = ? WHERE id = ?")
            .bind(timestamp_now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn map_session(row: &SqliteRow) -> DatabaseResult<Session> {
    let status: String = row.try_get("status")?;
    let participants: String = row.try_get("participants")?;
    let sub_topics: String = row.try_get("sub_topics")?;
    let focus_keywords: String = row.try_get("focus_keywords")?;
    let metadata: String = row.try_get("metadata")?;

    Ok(Session {
        id: row.try_get("id")?,
        host_id: row.try_get("host_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        skill_category: row.try_get("skill_category")?,
        status: parse_enum("status", &status)?,
        is_teaching: row.try_get("is_teaching")?,
        max_participants: row.try_get("max_participants")?,
        is_public: row.try_get("is_public")?,
        participants: decode_list("participants", &participants)?,
        teach_skill_id: row.try_get("teach_skill_id")?,
        teach_skill_name: row.try_get("teach_skill_name")?,
        sub_topics: decode_list("sub_topics", &sub_topics)?,
        meeting_link: row.try_get("meeting_link")?,
        focus_keywords: decode_list("focus_keywords", &focus_keywords)?,
        metadata: decode_list("metadata", &metadata)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
