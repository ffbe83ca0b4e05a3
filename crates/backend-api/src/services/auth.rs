use serde_json::Value;
use skillswap_auth::{AuthSession, Authenticator, Registration};
use skillswap_database::User;
use skillswap_integrations::StreamChatClient;
use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};

const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_registration(registration: &Registration) -> ServiceResult<()> {
    if registration.name.trim().is_empty() {
        return Err(ServiceError::bad_request("Name is required"));
    }
    if !registration.email.contains('@') {
        return Err(ServiceError::bad_request("A valid email is required"));
    }
    if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Creates the account and mirrors it to the chat service when one is configured.
pub async fn register(
    authenticator: &Authenticator,
    stream: Option<&StreamChatClient>,
    mut registration: Registration,
) -> ServiceResult<User> {
    validate_registration(&registration)?;
    registration.name = registration.name.trim().to_string();
    registration.email = registration.email.trim().to_string();

    let user = authenticator.register(registration).await?;

    if let Some(stream) = stream {
        match stream
            .upsert_user(&user.id, &user.name, Some(&user.avatar))
            .await
        {
            Ok(_) => info!(user = %user.id, "user mirrored to chat service"),
            Err(error) => warn!(user = %user.id, %error, "failed to mirror user to chat service"),
        }
    }

    Ok(user)
}

pub struct LoginOutcome {
    pub user: User,
    pub session: AuthSession,
    pub chat_token: Option<String>,
}

pub async fn login(
    authenticator: &Authenticator,
    stream: Option<&StreamChatClient>,
    email: &str,
    password: &str,
) -> ServiceResult<LoginOutcome> {
    let (user, session) = authenticator.login(email, password).await?;

    let chat_token = match stream {
        Some(stream) => match stream.create_user_token(&user.id) {
            Ok(token) => Some(token),
            Err(error) => {
                warn!(user = %user.id, %error, "failed to sign chat token");
                None
            }
        },
        None => None,
    };

    Ok(LoginOutcome {
        user,
        session,
        chat_token,
    })
}

pub async fn logout(authenticator: &Authenticator, token: &str) -> ServiceResult<()> {
    authenticator.revoke(token).await?;
    Ok(())
}

/// The chat service's record of a user.
pub async fn chat_user(stream: Option<&StreamChatClient>, user_id: &str) -> ServiceResult<Value> {
    let stream = stream.ok_or_else(|| ServiceError::unavailable("Chat service is not configured"))?;
    stream
        .query_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}
