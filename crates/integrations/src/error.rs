use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("integration is disabled")]
    Disabled,
    #[error("integration is not configured")]
    NotConfigured,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to sign token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl IntegrationError {
    /// Turns a non-success response into [`IntegrationError::Status`].
    pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, Self> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IntegrationError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
