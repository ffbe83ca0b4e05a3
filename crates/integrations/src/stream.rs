use std::time::Duration;

use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use skillswap_config::StreamConfig;
use tracing::debug;

use crate::{IntegrationError, IntegrationResult};

/// Channel type used for one-to-one conversations.
pub const MESSAGING_CHANNEL: &str = "messaging";

#[derive(Serialize)]
struct UserClaims<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct ServerClaims {
    server: bool,
}

/// REST client for the hosted chat service.
///
/// Every server-side call is signed with a JWT carrying `{"server": true}`
/// and the `api_key` query parameter.
#[derive(Clone)]
pub struct StreamChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    signing_key: EncodingKey,
}

impl std::fmt::Debug for StreamChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamChatClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl StreamChatClient {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: &str,
        base_url: &str,
        timeout: Duration,
    ) -> IntegrationResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            signing_key: EncodingKey::from_secret(api_secret.as_bytes()),
        })
    }

    /// Builds a client when both credentials are present, `None` otherwise.
    pub fn from_config(config: &StreamConfig) -> IntegrationResult<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }
        let (Some(api_key), Some(api_secret)) = (&config.api_key, &config.api_secret) else {
            return Ok(None);
        };

        Self::new(
            api_key.trim(),
            api_secret.trim(),
            &config.base_url,
            Duration::from_secs(config.timeout_seconds.max(1)),
        )
        .map(Some)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Token the client SDK uses to connect as `user_id`.
    pub fn create_user_token(&self, user_id: &str) -> IntegrationResult<String> {
        Ok(encode(
            &Header::default(),
            &UserClaims { user_id },
            &self.signing_key,
        )?)
    }

    pub async fn upsert_user(
        &self,
        id: &str,
        name: &str,
        image: Option<&str>,
    ) -> IntegrationResult<Value> {
        let mut user = json!({ "id": id, "name": name });
        if let Some(image) = image {
            user["image"] = Value::String(image.to_string());
        }
        let body = json!({ "users": { id: user } });

        self.send(self.request(reqwest::Method::POST, "/users")?.json(&body))
            .await
    }

    /// Looks up a single user. Resolves to `None` when the service has no such user.
    pub async fn query_user(&self, id: &str) -> IntegrationResult<Option<Value>> {
        let payload = json!({ "filter_conditions": { "id": { "$eq": id } } }).to_string();
        let reply = self
            .send(
                self.request(reqwest::Method::GET, "/users")?
                    .query(&[("payload", payload)]),
            )
            .await?;

        Ok(reply
            .get("users")
            .and_then(Value::as_array)
            .and_then(|users| users.first().cloned()))
    }

    /// Messaging channels the user is a member of.
    pub async fn query_channels(&self, user_id: &str) -> IntegrationResult<Vec<Value>> {
        let body = json!({
            "filter_conditions": {
                "type": MESSAGING_CHANNEL,
                "members": { "$in": [user_id] }
            },
            "sort": [{ "field": "last_message_at", "direction": -1 }],
            "state": true,
        });

        let reply = self
            .send(self.request(reqwest::Method::POST, "/channels")?.json(&body))
            .await?;

        Ok(reply
            .get("channels")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub async fn get_or_create_channel(
        &self,
        channel_type: &str,
        channel_id: &str,
        members: &[&str],
        created_by: &str,
    ) -> IntegrationResult<Value> {
        let body = json!({
            "data": { "members": members, "created_by_id": created_by },
            "state": true,
        });
        let path = format!("/channels/{channel_type}/{channel_id}/query");

        self.send(self.request(reqwest::Method::POST, &path)?.json(&body))
            .await
    }

    pub async fn send_message(
        &self,
        channel_type: &str,
        channel_id: &str,
        user_id: &str,
        text: &str,
    ) -> IntegrationResult<Value> {
        let body = json!({ "message": { "text": text, "user_id": user_id } });
        let path = format!("/channels/{channel_type}/{channel_id}/message");

        self.send(self.request(reqwest::Method::POST, &path)?.json(&body))
            .await
    }

    fn server_token(&self) -> IntegrationResult<String> {
        Ok(encode(
            &Header::default(),
            &ServerClaims { server: true },
            &self.signing_key,
        )?)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> IntegrationResult<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "chat service request");

        Ok(self
            .http
            .request(method, url)
            .header("Authorization", self.server_token()?)
            .header("stream-auth-type", "jwt")
            .query(&[("api_key", self.api_key.as_str())]))
    }

    async fn send(&self, request: RequestBuilder) -> IntegrationResult<Value> {
        let response = IntegrationError::check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}
