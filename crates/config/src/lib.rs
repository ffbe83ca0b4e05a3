use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "skillswap.toml",
    "config/skillswap.toml",
    "crates/config/skillswap.toml",
    "../skillswap.toml",
    "../config/skillswap.toml",
    "../crates/config/skillswap.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub keywords: KeywordServiceConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
    #[serde(default = "HttpConfig::default_environment")]
    pub environment: String,
    /// Origins allowed by CORS. An empty list allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl HttpConfig {
    fn default_environment() -> String {
        "development".to_string()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
            environment: Self::default_environment(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://skillswap.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Credentials for the hosted chat service.
///
/// Chat features stay disabled until both the key and the secret are set.
///
/// ```
/// use skillswap_config::StreamConfig;
///
/// let stream = StreamConfig::default();
/// assert_eq!(stream.base_url, "https://chat.stream-io-api.com");
/// assert_eq!(stream.timeout_seconds, 10);
/// assert!(!stream.is_configured());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default = "StreamConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "StreamConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl StreamConfig {
    fn default_base_url() -> String {
        "https://chat.stream-io-api.com".to_string()
    }

    const fn default_timeout() -> u64 {
        10
    }

    pub fn is_configured(&self) -> bool {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(|inner| !inner.trim().is_empty())
                .unwrap_or(false)
        };
        present(&self.api_key) && present(&self.api_secret)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url: Self::default_base_url(),
            timeout_seconds: Self::default_timeout(),
        }
    }
}

/// Keyword extraction service used to enrich skills and sessions.
///
/// ```
/// use skillswap_config::KeywordServiceConfig;
///
/// let keywords = KeywordServiceConfig::default();
/// assert_eq!(keywords.base_url, "http://localhost:8000");
/// assert_eq!(keywords.timeout_seconds, 30);
/// assert!(keywords.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordServiceConfig {
    #[serde(default = "KeywordServiceConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "KeywordServiceConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "KeywordServiceConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl KeywordServiceConfig {
    const fn default_enabled() -> bool {
        true
    }

    fn default_base_url() -> String {
        "http://localhost:8000".to_string()
    }

    const fn default_timeout() -> u64 {
        30
    }
}

impl Default for KeywordServiceConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            base_url: Self::default_base_url(),
            timeout_seconds: Self::default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "JobsConfig::default_expiry_enabled")]
    pub expiry_enabled: bool,
    /// Local hour of day (0-23) at which overdue exchange sessions are expired.
    #[serde(default = "JobsConfig::default_expiry_hour")]
    pub expiry_hour: u32,
}

impl JobsConfig {
    const fn default_expiry_enabled() -> bool {
        true
    }

    const fn default_expiry_hour() -> u32 {
        6
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            expiry_enabled: Self::default_expiry_enabled(),
            expiry_hour: Self::default_expiry_hour(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use skillswap_config::load;
///
/// std::env::remove_var("SKILLSWAP_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("http.environment", defaults.http.environment.clone())?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_ttl_seconds", session_ttl)?
        .set_default("stream.base_url", defaults.stream.base_url.clone())?
        .set_default(
            "stream.timeout_seconds",
            i64::try_from(defaults.stream.timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("keywords.enabled", defaults.keywords.enabled)?
        .set_default("keywords.base_url", defaults.keywords.base_url.clone())?
        .set_default(
            "keywords.timeout_seconds",
            i64::try_from(defaults.keywords.timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("jobs.expiry_enabled", defaults.jobs.expiry_enabled)?
        .set_default("jobs.expiry_hour", i64::from(defaults.jobs.expiry_hour))?;

    let environment_overrides = config::Environment::with_prefix("SKILLSWAP").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("SKILLSWAP_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via SKILLSWAP_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    if config.jobs.expiry_hour > 23 {
        anyhow::bail!(
            "jobs.expiry_hour must be between 0 and 23, got {}",
            config.jobs.expiry_hour
        );
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
