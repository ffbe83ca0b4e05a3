//! Behavioural tests for the `skillswap-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and validation behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use skillswap_config::{load, AppConfig, HttpConfig, JobsConfig, StreamConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "SKILLSWAP_CONFIG",
    "SKILLSWAP__AUTH__SESSION_TTL_SECONDS",
    "SKILLSWAP__DATABASE__MAX_CONNECTIONS",
    "SKILLSWAP__DATABASE__URL",
    "SKILLSWAP__HTTP__ADDRESS",
    "SKILLSWAP__HTTP__PORT",
    "SKILLSWAP__HTTP__ENVIRONMENT",
    "SKILLSWAP__STREAM__API_KEY",
    "SKILLSWAP__STREAM__API_SECRET",
    "SKILLSWAP__STREAM__BASE_URL",
    "SKILLSWAP__KEYWORDS__BASE_URL",
    "SKILLSWAP__KEYWORDS__ENABLED",
    "SKILLSWAP__JOBS__EXPIRY_HOUR",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

fn isolated() -> (TempDir, TestContext) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    (temp_dir, ctx)
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let (_temp_dir, _ctx) = isolated();

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.http.environment, "development");
    assert!(config.http.cors_allowed_origins.is_empty());
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(
        config.database.max_connections,
        defaults.database.max_connections
    );
    assert_eq!(config.auth.session_ttl_seconds, defaults.auth.session_ttl_seconds);
    assert!(!config.stream.is_configured());
    assert_eq!(config.keywords.base_url, defaults.keywords.base_url);
    assert_eq!(config.jobs.expiry_hour, 6);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "skillswap.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/skillswap.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "skillswap.toml",
        r#"
        [http]
        port = 8181
        cors_allowed_origins = ["http://localhost:5173"]

        [database]
        max_connections = 50

        [keywords]
        enabled = false
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.http.port, 8181);
    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(
        config.http.cors_allowed_origins,
        vec!["http://localhost:5173".to_string()]
    );
    assert_eq!(config.database.max_connections, 50);
    assert_eq!(config.database.url, defaults.database.url);
    assert!(!config.keywords.enabled);
    assert_eq!(config.keywords.timeout_seconds, defaults.keywords.timeout_seconds);
}

#[test]
#[serial]
fn load_reads_explicit_config_path_from_environment() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [http]
        port = 9191
        "#,
    );
    ctx.set_var(
        "SKILLSWAP_CONFIG",
        temp_dir.path().join("elsewhere/custom.toml").to_string_lossy(),
    );

    let config = load().expect("configuration load should read the explicit file");
    assert_eq!(config.http.port, 9191);
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "skillswap.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("SKILLSWAP__HTTP__PORT", "8080");
    ctx.set_var("SKILLSWAP__DATABASE__URL", "sqlite://override.db");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.database.url, "sqlite://override.db");
}

#[test]
#[serial]
fn load_accepts_stream_credentials_from_env() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var("SKILLSWAP__STREAM__API_KEY", "stream-key");
    ctx.set_var("SKILLSWAP__STREAM__API_SECRET", "stream-secret");

    let config = load().expect("configuration load should read stream credentials");
    assert_eq!(config.stream.api_key.as_deref(), Some("stream-key"));
    assert_eq!(config.stream.api_secret.as_deref(), Some("stream-secret"));
    assert!(config.stream.is_configured());
    assert_eq!(config.stream.base_url, StreamConfig::default().base_url);
}

#[test]
#[serial]
fn load_clamps_session_ttl_to_i64_maximum() {
    let (_temp_dir, mut ctx) = isolated();

    let oversized = (i64::MAX as u64 + 42).to_string();
    ctx.set_var("SKILLSWAP__AUTH__SESSION_TTL_SECONDS", &oversized);

    let config = load().expect("configuration load should succeed with oversized TTL");
    assert_eq!(
        config.auth.session_ttl_seconds,
        i64::MAX as u64,
        "session TTL should be clamped to i64::MAX"
    );
}

#[test]
#[serial]
fn load_rejects_out_of_range_expiry_hour() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "skillswap.toml",
        r#"
        [jobs]
        expiry_hour = 24
        "#,
    );

    let error = load().expect_err("expiry hour 24 should be rejected");
    assert!(error.to_string().contains("expiry_hour"));
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "skillswap.toml",
        r#"
        [http]
        port = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration") || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn stream_config_requires_both_credentials() {
    let mut stream = StreamConfig {
        api_key: Some("key".into()),
        ..StreamConfig::default()
    };
    assert!(!stream.is_configured());

    stream.api_secret = Some("   ".into());
    assert!(!stream.is_configured());

    stream.api_secret = Some("secret".into());
    assert!(stream.is_configured());
}

#[test]
fn jobs_config_defaults_to_six_am_expiry() {
    let defaults = JobsConfig::default();
    assert!(defaults.expiry_enabled);
    assert_eq!(defaults.expiry_hour, 6);
}

#[test]
fn http_config_defaults_match_expected_host_and_port() {
    let defaults = HttpConfig::default();
    assert_eq!(defaults.address, "127.0.0.1");
    assert_eq!(defaults.port, 3000);
}
