//! User repository for database operations.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::search::{SearchPage, SearchTerm};
use crate::entities::{
    new_id, parse_enum, timestamp_now, NewUser, User, UserStats, UserSummary, UserUpdate,
    DEFAULT_AVATAR_URL,
};
use crate::types::{DatabaseError, DatabaseResult};

const USER_COLUMNS: &str =
    "id, name, email, location, bio, avatar, status, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user. Emails are stored lowercased and must be unique.
    pub async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let id = new_id();
        let now = timestamp_now();
        let email = new_user.email.trim().to_lowercase();
        let avatar = new_user
            .avatar
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string());

        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, location, bio, avatar, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'offline', ?, ?)",
        )
        .bind(&id)
        .bind(new_user.name.trim())
        .bind(&email)
        .bind(&new_user.password_hash)
        .bind(&new_user.location)
        .bind(&new_user.bio)
        .bind(&avatar)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(error) if DatabaseError::is_unique_violation(&error) => {
                return Err(DatabaseError::Duplicate(format!("user with email {email}")));
            }
            Err(error) => return Err(error.into()),
        }

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {id}")))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Returns the user together with the stored password hash.
    pub async fn find_credentials(&self, email: &str) -> DatabaseResult<Option<(User, String)>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let user = map_user(&row)?;
                let hash: String = row.try_get("password_hash")?;
                Ok(Some((user, hash)))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&self, limit: i64, offset: i64) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Case-insensitive substring search over name, email, bio and location.
    pub async fn search(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<SearchPage<User>> {
        let term = SearchTerm::new(query);
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name ASC, rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::new();
        for row in &rows {
            let user = map_user(row)?;
            let fields = [
                user.name.as_str(),
                user.email.as_str(),
                user.bio.as_deref().unwrap_or_default(),
                user.location.as_deref().unwrap_or_default(),
            ];
            if term.matches_any(fields) {
                hits.push(user);
            }
        }
        Ok(SearchPage::from_hits(hits, limit, offset))
    }

    /// Users other than `exclude_id`, oldest accounts first.
    pub async fn suggested(&self, exclude_id: &str, limit: i64) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id != ? ORDER BY created_at ASC, rowid ASC LIMIT ?"
        ))
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> DatabaseResult<Option<User>> {
        let now = timestamp_now();
        let result = sqlx::query(
            "UPDATE users SET
                name = COALESCE(?, name),
                bio = COALESCE(?, bio),
                location = COALESCE(?, location),
                avatar = COALESCE(?, avatar),
                status = COALESCE(?, status),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.bio)
        .bind(&update.location)
        .bind(&update.avatar)
        .bind(update.status.map(|status| status.as_str()))
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn summaries(&self, ids: &[String]) -> DatabaseResult<Vec<UserSummary>> {
        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.find_by_id(id).await? {
                summaries.push(user.summary());
            }
        }
        Ok(summaries)
    }

    /// Session counters across hosted and joined learning sessions.
    pub async fn stats(&self, id: &str) -> DatabaseResult<UserStats> {
        let row = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM sessions WHERE host_id = ?1) AS hosted,
                (SELECT COUNT(*) FROM session_participants WHERE user_id = ?1) AS participated,
                (SELECT COUNT(*) FROM sessions s
                  WHERE s.status = 'completed'
                    AND (s.host_id = ?1 OR EXISTS (
                        SELECT 1 FROM session_participants sp
                        WHERE sp.session_id = s.id AND sp.user_id = ?1))) AS completed",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let hosted: i64 = row.try_get("hosted")?;
        let participated: i64 = row.try_get("participated")?;
        Ok(UserStats {
            total_sessions: hosted + participated,
            completed_sessions: row.try_get("completed")?,
            hosted_sessions: hosted,
            participated_sessions: participated,
        })
    }
}

pub(crate) fn map_user(row: &SqliteRow) -> DatabaseResult<User> {
    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        location: row.try_get("location")?,
        bio: row.try_get("bio")?,
        avatar: row.try_get("avatar")?,
        status: parse_enum("status", &status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

