//! Aggregated dashboard view over a user's exchange sessions.
//!
//! Everything is derived from the sessions where the caller is the host or
//! the requesting partner, with calendar math done in server local time.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Serialize;
use skillswap_database::{
    CategoryCount, ExchangeSession, ExchangeSessionStatus, SkillRepository, User, UserRepository,
};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::error::ServiceResult;
use super::exchange_sessions;
use crate::util::{format_date, parse_time};

pub const UPCOMING_WINDOW_DAYS: u64 = 7;
pub const LIST_LIMIT: usize = 5;
pub const TREND_DAYS: u64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub scheduled_sessions: i64,
    pub unique_partners: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyActivity {
    pub date: String,
    pub sessions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KpiAnalytics {
    pub today_sessions: i64,
    pub this_month_completed: i64,
    pub last_month_completed: i64,
    pub completion_change_percent: f64,
    pub growth_rate_percent: f64,
    pub weekly_activity: Vec<DailyActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecentConnection {
    pub session_id: String,
    pub partner_id: String,
    pub partner_name: String,
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LearningProgress {
    pub date: String,
    pub hours: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardData {
    pub user: User,
    pub stats: DashboardStats,
    pub kpi_analytics: KpiAnalytics,
    pub upcoming_sessions: Vec<ExchangeSession>,
    pub recent_connections: Vec<RecentConnection>,
    pub skill_categories: Vec<CategoryCount>,
    pub learning_progress: Vec<LearningProgress>,
    pub today_sessions: Vec<ExchangeSession>,
}

pub async fn load(pool: &SqlitePool, user: User) -> ServiceResult<DashboardData> {
    let today = Local::now().date_naive();
    let sessions = exchange_sessions::list_mine(pool, &user.id).await?;

    let summary = exchange_sessions::summarize(&sessions, &user.id);
    let stats = DashboardStats {
        total_sessions: sessions.len() as i64,
        completed_sessions: summary.completed_sessions,
        scheduled_sessions: summary.scheduled_sessions,
        unique_partners: summary.unique_partners,
    };

    let mut recent_connections = Vec::new();
    let users = UserRepository::new(pool.clone());
    for session in recent_completed(&sessions) {
        let partner_id = session.partner_of(&user.id).to_string();
        let partner_name = users
            .find_by_id(&partner_id)
            .await?
            .map(|partner| partner.name)
            .unwrap_or_else(|| "Unknown user".to_string());
        recent_connections.push(RecentConnection {
            session_id: session.id.clone(),
            partner_id,
            partner_name,
            title: session.title.clone(),
            date: session.date.clone(),
        });
    }

    let skill_categories = SkillRepository::new(pool.clone())
        .category_counts(&user.id)
        .await?;

    Ok(DashboardData {
        stats,
        kpi_analytics: kpi_analytics(&sessions, today),
        upcoming_sessions: upcoming_within(&sessions, today, UPCOMING_WINDOW_DAYS),
        recent_connections,
        skill_categories,
        learning_progress: learning_progress(&sessions, today),
        today_sessions: on_date(&sessions, today),
        user,
    })
}

fn on_date(sessions: &[ExchangeSession], date: NaiveDate) -> Vec<ExchangeSession> {
    let date = format_date(date);
    sessions
        .iter()
        .filter(|session| session.date == date)
        .cloned()
        .collect()
}

fn upcoming_within(
    sessions: &[ExchangeSession],
    today: NaiveDate,
    days: u64,
) -> Vec<ExchangeSession> {
    let from = format_date(today);
    let to = format_date(today.checked_add_days(Days::new(days)).unwrap_or(today));
    // Sessions arrive ordered by date and start time.
    sessions
        .iter()
        .filter(|session| session.status == ExchangeSessionStatus::Upcoming)
        .filter(|session| session.date >= from && session.date <= to)
        .take(LIST_LIMIT)
        .cloned()
        .collect()
}

fn recent_completed(sessions: &[ExchangeSession]) -> Vec<&ExchangeSession> {
    let mut completed: Vec<&ExchangeSession> = sessions
        .iter()
        .filter(|session| session.status == ExchangeSessionStatus::Completed)
        .collect();
    completed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    completed.truncate(LIST_LIMIT);
    completed
}

/// The `TREND_DAYS` dates ending at `today`, oldest first.
fn trailing_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..TREND_DAYS)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn completion_change(this_month: i64, last_month: i64) -> f64 {
    match (this_month, last_month) {
        (0, 0) => 0.0,
        (_, 0) => 100.0,
        (this, last) => round_one_decimal((this - last) as f64 / last as f64 * 100.0),
    }
}

fn kpi_analytics(sessions: &[ExchangeSession], today: NaiveDate) -> KpiAnalytics {
    let this_month = today.format("%Y-%m").to_string();
    let last_month = today
        .with_day(1)
        .and_then(|first| first.pred_opt())
        .map(|date| date.format("%Y-%m").to_string())
        .unwrap_or_default();

    let completed: Vec<&ExchangeSession> = sessions
        .iter()
        .filter(|session| session.status == ExchangeSessionStatus::Completed)
        .collect();
    let completed_in = |month: &str| {
        completed
            .iter()
            .filter(|session| session.date.starts_with(month))
            .count() as i64
    };
    let this_month_completed = completed_in(&this_month);
    let last_month_completed = completed_in(&last_month);

    let growth_rate_percent = if sessions.is_empty() {
        0.0
    } else {
        round_one_decimal(completed.len() as f64 / sessions.len() as f64 * 100.0)
    };

    let weekly_activity = trailing_days(today)
        .into_iter()
        .map(|day| {
            let date = format_date(day);
            let count = sessions.iter().filter(|session| session.date == date).count();
            DailyActivity {
                date,
                sessions: count as i64,
            }
        })
        .collect();

    KpiAnalytics {
        today_sessions: on_date(sessions, today).len() as i64,
        this_month_completed,
        last_month_completed,
        completion_change_percent: completion_change(this_month_completed, last_month_completed),
        growth_rate_percent,
        weekly_activity,
    }
}

/// Length of a session in hours, never less than one.
fn session_hours(session: &ExchangeSession) -> f64 {
    match (parse_time(&session.start_time), parse_time(&session.end_time)) {
        (Some(start), Some(end)) => {
            let hours = (end - start).num_minutes() as f64 / 60.0;
            hours.max(1.0)
        }
        _ => 1.0,
    }
}

fn learning_progress(sessions: &[ExchangeSession], today: NaiveDate) -> Vec<LearningProgress> {
    trailing_days(today)
        .into_iter()
        .map(|day| {
            let date = format_date(day);
            let hours = sessions
                .iter()
                .filter(|session| session.status == ExchangeSessionStatus::Completed)
                .filter(|session| session.date == date)
                .map(session_hours)
                .sum::<f64>();
            LearningProgress {
                date,
                hours: round_one_decimal(hours),
            }
        })
        .collect()
}
