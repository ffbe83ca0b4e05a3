use std::{sync::Arc, time::Instant};

use skillswap_auth::{AuthSession, Authenticator};
use skillswap_database::User;
use skillswap_integrations::{KeywordClient, StreamChatClient};
use sqlx::SqlitePool;

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    db_pool: SqlitePool,
    authenticator: Authenticator,
    keywords: Arc<KeywordClient>,
    stream: Option<Arc<StreamChatClient>>,
    settings: Arc<ApiSettings>,
}

/// Deployment facts reported by `/status` and used to build the CORS layer.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub environment: String,
    pub cors_allowed_origins: Vec<String>,
    pub started_at: Instant,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            cors_allowed_origins: Vec::new(),
            started_at: Instant::now(),
        }
    }
}

impl AppState {
    pub fn new(
        db_pool: SqlitePool,
        authenticator: Authenticator,
        keywords: Arc<KeywordClient>,
        stream: Option<Arc<StreamChatClient>>,
    ) -> Self {
        Self {
            db_pool,
            authenticator,
            keywords,
            stream,
            settings: Arc::new(ApiSettings::default()),
        }
    }

    pub fn with_settings(mut self, settings: ApiSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn keywords(&self) -> Arc<KeywordClient> {
        Arc::clone(&self.keywords)
    }

    pub fn stream(&self) -> Option<&StreamChatClient> {
        self.stream.as_deref()
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}
