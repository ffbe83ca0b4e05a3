use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use skillswap_config::KeywordServiceConfig;
use tracing::debug;

use crate::{IntegrationError, IntegrationResult};

/// Client for the keyword extraction service.
#[derive(Debug, Clone)]
pub struct KeywordClient {
    http: Client,
    base_url: String,
    enabled: bool,
}

#[derive(Serialize)]
struct KeywordQuery<'a> {
    topic: &'a str,
    sub_topics: &'a [String],
}

#[derive(Deserialize)]
struct KeywordReply {
    #[serde(default)]
    response: Vec<String>,
}

impl KeywordClient {
    pub fn new(config: &KeywordServiceConfig) -> IntegrationResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn extract(&self, topic: &str, sub_topics: &[String]) -> IntegrationResult<Vec<String>> {
        if !self.enabled {
            return Err(IntegrationError::Disabled);
        }

        let url = format!("{}/llm/query", self.base_url);
        debug!(%url, topic, "requesting keywords");

        let response = self
            .http
            .post(url)
            .json(&KeywordQuery { topic, sub_topics })
            .send()
            .await?;
        let reply: KeywordReply = IntegrationError::check(response).await?.json().await?;

        Ok(reply
            .response
            .into_iter()
            .map(|keyword| keyword.trim().to_string())
            .filter(|keyword| !keyword.is_empty())
            .collect())
    }
}
