//! Exchange request repository.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::entities::{
    new_id, parse_enum, timestamp_now, ExchangeRequest, ExchangeRequestStatus, NewExchangeRequest,
};
use crate::types::{DatabaseError, DatabaseResult};

const REQUEST_SELECT: &str = "SELECT er.id, er.session_id, er.requester_id, er.recipient_id, \
     er.offered_skill_id, er.requested_skill_id, er.message, er.status, er.created_at, er.updated_at, \
     s.title AS session_title, \
     requester.name AS requester_name, \
     recipient.name AS recipient_name, \
     offered.name AS offered_skill_name, \
     requested.name AS requested_skill_name \
     FROM exchange_requests er \
     LEFT JOIN sessions s ON s.id = er.session_id \
     LEFT JOIN users requester ON requester.id = er.requester_id \
     LEFT JOIN users recipient ON recipient.id = er.recipient_id \
     LEFT JOIN skills offered ON offered.id = er.offered_skill_id \
     LEFT JOIN skills requested ON requested.id = er.requested_skill_id";

#[derive(Clone)]
pub struct ExchangeRequestRepository {
    pool: SqlitePool,
}

impl ExchangeRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &NewExchangeRequest) -> DatabaseResult<ExchangeRequest> {
        let id = new_id();
        let now = timestamp_now();

        sqlx::query(
            "INSERT INTO exchange_requests (id, session_id, requester_id, recipient_id,
                                            offered_skill_id, requested_skill_id, message, status,
                                            created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
        )
        .bind(&id)
        .bind(&request.session_id)
        .bind(&request.requester_id)
        .bind(&request.recipient_id)
        .bind(&request.offered_skill_id)
        .bind(&request.requested_skill_id)
        .bind(&request.message)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("exchange request {id}")))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<ExchangeRequest>> {
        let row = sqlx::query(&format!("{REQUEST_SELECT} WHERE er.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_request).transpose()
    }

    /// Requests the user sent or received, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DatabaseResult<Vec<ExchangeRequest>> {
        let rows = sqlx::query(&format!(
            "{REQUEST_SELECT}
             WHERE er.requester_id = ?1 OR er.recipient_id = ?1
             ORDER BY er.created_at DESC, er.rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_request).collect()
    }

    /// Requests attached to sessions hosted by `host_id`.
    pub async fn list_for_host(&self, host_id: &str) -> DatabaseResult<Vec<ExchangeRequest>> {
        let rows = sqlx::query(&format!(
            "{REQUEST_SELECT}
             WHERE s.host_id = ?
             ORDER BY er.created_at DESC, er.rowid DESC"
        ))
        .bind(host_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_request).collect()
    }

    pub async fn list_all(&self) -> DatabaseResult<Vec<ExchangeRequest>> {
        let rows = sqlx::query(&format!(
            "{REQUEST_SELECT} ORDER BY er.created_at DESC, er.rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_request).collect()
    }

    pub async fn list_by_session(&self, session_id: &str) -> DatabaseResult<Vec<ExchangeRequest>> {
        let rows = sqlx::query(&format!(
            "{REQUEST_SELECT}
             WHERE er.session_id = ?
             ORDER BY er.created_at DESC, er.rowid DESC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_request).collect()
    }

    /// Moves a request out of `expected`. Returns `None` when the request is
    /// missing or was no longer in the expected state.
    pub async fn transition_status(
        &self,
        id: &str,
        expected: ExchangeRequestStatus,
        next: ExchangeRequestStatus,
    ) -> DatabaseResult<Option<ExchangeRequest>> {
        let result = sqlx::query(
            "UPDATE exchange_requests SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(next.as_str())
        .bind(timestamp_now())
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

fn map_request(row: &SqliteRow) -> DatabaseResult<ExchangeRequest> {
    let status: String = row.try_get("status")?;
    Ok(ExchangeRequest {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        session_title: row.try_get("session_title")?,
        requester_id: row.try_get("requester_id")?,
        requester_name: row.try_get("requester_name")?,
        recipient_id: row.try_get("recipient_id")?,
        recipient_name: row.try_get("recipient_name")?,
        offered_skill_id: row.try_get("offered_skill_id")?,
        offered_skill_name: row.try_get("offered_skill_name")?,
        requested_skill_id: row.try_get("requested_skill_id")?,
        requested_skill_name: row.try_get("requested_skill_name")?,
        message: row.try_get("message")?,
        status: parse_enum("status", &status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
