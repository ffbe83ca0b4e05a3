use std::path::Path;

use anyhow::{Context, Result};
use skillswap_backend_runtime::{jobs, BackendServices};
use skillswap_config::{AppConfig, JobsConfig};
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config.keywords.enabled = false;
    config.stream.api_key = None;
    config.stream.api_secret = None;
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = initialise(&config).await?;
    for expected in ["users", "skills", "sessions", "exchange_sessions", "notifications"] {
        let table: String = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(expected)
        .fetch_one(&services.db_pool)
        .await?;
        assert_eq!(expected, table);
    }

    assert!(!services.keywords.is_enabled());
    assert!(services.stream.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_creates_sqlite_directory_if_missing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_dir = temp_dir.path().join("nested");
    let db_path = db_dir.join("prepared.db");
    let config = build_config(sqlite_url(&db_path), 2);

    assert!(!db_dir.exists());

    let services = initialise(&config).await?;
    assert!(db_dir.exists(), "database directory should be created");
    drop(services);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn prepare_database_enables_sqlite_foreign_keys() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/foreign_keys.db");
    let config = build_config(sqlite_url(&db_path), 2);

    let services = initialise(&config).await?;

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&services.db_pool)
        .await?;
    assert_eq!(1, enabled, "foreign key enforcement must be enabled");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_client_is_built_only_with_credentials() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("chat.db");
    let mut config = build_config(sqlite_url(&db_path), 2);
    config.stream.api_key = Some("key".into());
    config.stream.api_secret = Some("secret".into());

    let services = initialise(&config).await?;
    let stream = services.stream.as_ref().context("chat client expected")?;
    assert_eq!(stream.api_key(), "key");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn app_state_carries_http_settings() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("settings.db");
    let mut config = build_config(sqlite_url(&db_path), 2);
    config.http.environment = "production".into();
    config.http.cors_allowed_origins = vec!["https://skillswap.example".into()];

    let services = initialise(&config).await?;
    let state = services.app_state();
    assert_eq!(state.settings().environment, "production");
    assert_eq!(
        state.settings().cors_allowed_origins,
        vec!["https://skillswap.example".to_string()]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn expiry_pass_marks_only_overdue_sessions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("expiry.db");
    let services = initialise(&build_config(sqlite_url(&db_path), 2)).await?;
    let pool = &services.db_pool;

    for (id, name) in [("u1", "Host"), ("u2", "Partner")] {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, avatar, status, created_at, updated_at)
             VALUES (?, ?, ?, 'hash', '', 'offline', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(name)
        .bind(format!("{id}@example.com"))
        .execute(pool)
        .await?;
    }
    for (id, owner) in [("k1", "u1"), ("k2", "u2")] {
        sqlx::query(
            "INSERT INTO skills (id, user_id, name, category, proficiency, skill_type, agenda, metadata, created_at, updated_at)
             VALUES (?, ?, 'Skill', 'General', 50, 'teaching', '[]', '[]', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;
    }
    for (id, date) in [("past", "2020-01-01"), ("future", "2999-01-01")] {
        sqlx::query(
            "INSERT INTO exchange_sessions
                (id, title, date, start_time, end_time, skill_category, status, max_participants,
                 is_public, host_id, requested_by, skill_id, requested_skill_id,
                 focus_keywords, requested_skill_focus_keywords, session_agenda, created_at, updated_at)
             VALUES (?, 'Swap', ?, '10:00', '11:00', 'General', 'upcoming', 2, 0, 'u1', 'u2', 'k1', 'k2',
                     '[]', '[]', '[]', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(date)
        .execute(pool)
        .await?;
    }

    assert_eq!(jobs::run_expiry_once(pool).await?, 1);
    assert_eq!(jobs::run_expiry_once(pool).await?, 0);

    let status: String = sqlx::query_scalar("SELECT status FROM exchange_sessions WHERE id = 'past'")
        .fetch_one(pool)
        .await?;
    assert_eq!(status, "expired");
    let status: String =
        sqlx::query_scalar("SELECT status FROM exchange_sessions WHERE id = 'future'")
            .fetch_one(pool)
            .await?;
    assert_eq!(status, "upcoming");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn expiry_job_respects_the_enabled_flag() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("job.db");
    let services = initialise(&build_config(sqlite_url(&db_path), 2)).await?;

    let disabled = JobsConfig {
        expiry_enabled: false,
        expiry_hour: 6,
    };
    assert!(jobs::spawn_expiry_job(services.db_pool.clone(), &disabled).is_none());

    let handle = jobs::spawn_expiry_job(services.db_pool.clone(), &JobsConfig::default())
        .context("job should be scheduled")?;
    assert!(!handle.is_finished());
    handle.abort();
    Ok(())
}
