//! Notification repository for database operations.
//!
//! Deletes are soft: rows are flagged `is_deleted` and hidden from every read.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::entities::{new_id, timestamp_now, NewNotification, Notification};
use crate::types::{DatabaseError, DatabaseResult};

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, sender_id, title, message, \
     notification_type, exchange_request_id, session_id, is_read, created_at, updated_at";

/// Repository for notification database operations
#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, notification: &NewNotification) -> DatabaseResult<Notification> {
        let id = new_id();
        let now = timestamp_now();

        sqlx::query(
            "INSERT INTO notifications (id, recipient_id, sender_id, title, message,
                                        notification_type, exchange_request_id, session_id,
                                        is_read, is_deleted, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)",
        )
        .bind(&id)
        .bind(&notification.recipient_id)
        .bind(&notification.sender_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.notification_type)
        .bind(&notification.exchange_request_id)
        .bind(&notification.session_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_for_recipient(&id, &notification.recipient_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("notification {id}")))
    }

    /// Looks up a live notification owned by `recipient_id`.
    pub async fn find_for_recipient(
        &self,
        id: &str,
        recipient_id: &str,
    ) -> DatabaseResult<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE id = ? AND recipient_id = ? AND is_deleted = 0"
        ))
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_notification).transpose()
    }

    pub async fn list_for_recipient(
        &self,
        recipient_id: &str,
        unread_only: bool,
    ) -> DatabaseResult<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE recipient_id = ? AND is_deleted = 0 AND (? = 0 OR is_read = 0)
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(recipient_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_notification).collect()
    }

    pub async fn unread_count(&self, recipient_id: &str) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications
             WHERE recipient_id = ? AND is_deleted = 0 AND is_read = 0",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn mark_read(
        &self,
        id: &str,
        recipient_id: &str,
    ) -> DatabaseResult<Option<Notification>> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ?
             WHERE id = ? AND recipient_id = ? AND is_deleted = 0",
        )
        .bind(timestamp_now())
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_for_recipient(id, recipient_id).await
    }

    pub async fn mark_all_read(&self, recipient_id: &str) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ?
             WHERE recipient_id = ? AND is_deleted = 0 AND is_read = 0",
        )
        .bind(timestamp_now())
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete(&self, id: &str, recipient_id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_deleted = 1, updated_at = ?
             WHERE id = ? AND recipient_id = ? AND is_deleted = 0",
        )
        .bind(timestamp_now())
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_notification(row: &SqliteRow) -> DatabaseResult<Notification> {
    Ok(Notification {
        id: row.try_get("id")?,
        recipient_id: row.try_get("recipient_id")?,
        sender_id: row.try_get("sender_id")?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        notification_type: row.try_get("notification_type")?,
        exchange_request_id: row.try_get("exchange_request_id")?,
        session_id: row.try_get("session_id")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
