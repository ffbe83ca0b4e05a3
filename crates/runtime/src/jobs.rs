//! Scheduled maintenance for exchange sessions.
//!
//! Once a day, at the configured local hour, upcoming exchange sessions whose
//! start has passed are marked as expired.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use skillswap_backend_api::services::exchange_sessions;
use skillswap_config::JobsConfig;
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tracing::{error, info};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Expires overdue exchange sessions once and reports how many changed.
pub async fn run_expiry_once(pool: &SqlitePool) -> Result<u64> {
    let expired = exchange_sessions::expire_overdue(pool)
        .await
        .context("failed to expire overdue exchange sessions")?;
    info!(expired, "exchange session expiry pass finished");
    Ok(expired)
}

/// Time from `now` until the next occurrence of `hour:00` local time.
pub fn until_next_run<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Duration {
    let Some(at) = NaiveTime::from_hms_opt(hour.min(23), 0, 0) else {
        return DAY;
    };

    let local = now.naive_local();
    let today = local.date().and_time(at);
    let next = if today > local {
        today
    } else {
        local
            .date()
            .checked_add_days(Days::new(1))
            .map(|date| date.and_time(at))
            .unwrap_or(today)
    };

    (next - local).to_std().unwrap_or(DAY)
}

/// Spawns the daily expiry loop. Returns `None` when the job is disabled.
pub fn spawn_expiry_job(pool: SqlitePool, config: &JobsConfig) -> Option<JoinHandle<()>> {
    if !config.expiry_enabled {
        info!("exchange session expiry job disabled");
        return None;
    }

    let hour = config.expiry_hour;
    Some(tokio::spawn(async move {
        let mut delay = until_next_run(&Local::now(), hour);
        loop {
            info!(
                hour,
                wait_secs = delay.as_secs(),
                "next exchange session expiry scheduled"
            );
            tokio::time::sleep(delay).await;

            if let Err(err) = run_expiry_once(&pool).await {
                error!(error = %format!("{err:#}"), "exchange session expiry failed");
            }
            delay = until_next_run(&Local::now(), hour);
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn waits_until_later_today() {
        let delay = until_next_run(&at("2025-03-01T04:30:00Z"), 6);
        assert_eq!(delay, Duration::from_secs(90 * 60));
    }

    #[test]
    fn rolls_over_to_tomorrow_once_the_hour_has_passed() {
        let delay = until_next_run(&at("2025-03-01T06:00:00Z"), 6);
        assert_eq!(delay, DAY);

        let delay = until_next_run(&at("2025-03-01T23:00:00Z"), 6);
        assert_eq!(delay, Duration::from_secs(7 * 60 * 60));
    }

    #[test]
    fn hours_past_midnight_are_clamped() {
        let delay = until_next_run(&at("2025-03-01T22:00:00Z"), 42);
        assert_eq!(delay, Duration::from_secs(60 * 60));
    }
}
