use skillswap_database::{Notification, NotificationRepository};
use sqlx::SqlitePool;
use tracing::debug;

use super::error::{ServiceError, ServiceResult};

pub async fn list(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<Notification>> {
    Ok(NotificationRepository::new(pool.clone())
        .list_for_recipient(user_id, false)
        .await?)
}

pub async fn list_unread(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<Notification>> {
    Ok(NotificationRepository::new(pool.clone())
        .list_for_recipient(user_id, true)
        .await?)
}

pub async fn unread_count(pool: &SqlitePool, user_id: &str) -> ServiceResult<i64> {
    Ok(NotificationRepository::new(pool.clone())
        .unread_count(user_id)
        .await?)
}

pub async fn mark_read(pool: &SqlitePool, user_id: &str, id: &str) -> ServiceResult<Notification> {
    NotificationRepository::new(pool.clone())
        .mark_read(id, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Notification not found"))
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: &str) -> ServiceResult<u64> {
    let updated = NotificationRepository::new(pool.clone())
        .mark_all_read(user_id)
        .await?;
    debug!(user = %user_id, updated, "marked notifications as read");
    Ok(updated)
}

pub async fn delete(pool: &SqlitePool, user_id: &str, id: &str) -> ServiceResult<()> {
    let deleted = NotificationRepository::new(pool.clone())
        .soft_delete(id, user_id)
        .await?;
    if !deleted {
        return Err(ServiceError::not_found("Notification not found"));
    }
    Ok(())
}
