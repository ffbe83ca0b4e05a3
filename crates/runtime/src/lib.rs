use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result};
use skillswap_auth::Authenticator;
use skillswap_backend_api::{ApiSettings, AppState};
use skillswap_config::AppConfig;
use skillswap_database::initialize_database;
use skillswap_integrations::{KeywordClient, StreamChatClient};
use sqlx::SqlitePool;
use tracing::info;

pub mod jobs;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::DEBUG)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub keywords: Arc<KeywordClient>,
    pub stream: Option<Arc<StreamChatClient>>,
    pub settings: ApiSettings,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());

        let keywords = Arc::new(
            KeywordClient::new(&config.keywords).context("failed to build keyword client")?,
        );
        if keywords.is_enabled() {
            info!(base_url = %config.keywords.base_url, "keyword enrichment enabled");
        } else {
            info!("keyword enrichment disabled");
        }

        let stream = StreamChatClient::from_config(&config.stream)
            .context("failed to build chat client")?
            .map(Arc::new);
        match &stream {
            Some(client) => info!(?client, "chat service configured"),
            None => tracing::warn!("chat credentials missing, chat routes will answer 503"),
        }

        let settings = ApiSettings {
            environment: config.http.environment.clone(),
            cors_allowed_origins: config.http.cors_allowed_origins.clone(),
            started_at: Instant::now(),
        };

        Ok(Self {
            db_pool,
            authenticator,
            keywords,
            stream,
            settings,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.db_pool.clone(),
            self.authenticator.clone(),
            Arc::clone(&self.keywords),
            self.stream.clone(),
        )
        .with_settings(self.settings.clone())
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
