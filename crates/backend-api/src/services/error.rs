use skillswap_database::DatabaseError;
use skillswap_integrations::IntegrationError;

/// Failure of a business rule or of a dependency underneath it.
#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    Forbidden(String),
    BadRequest(String),
    Unavailable(String),
    Database(DatabaseError),
    Auth(skillswap_auth::AuthError),
    Integration(IntegrationError),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Unavailable(msg) => f.write_str(msg),
            Self::Database(err) => write!(f, "database error: {err}"),
            Self::Auth(err) => write!(f, "auth error: {err}"),
            Self::Integration(err) => write!(f, "integration error: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ServiceError> for crate::ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => crate::ApiError::not_found(msg),
            ServiceError::Forbidden(msg) => crate::ApiError::forbidden(msg),
            ServiceError::BadRequest(msg) => crate::ApiError::bad_request(msg),
            ServiceError::Unavailable(msg) => crate::ApiError::service_unavailable(msg),
            ServiceError::Database(db_err) => crate::ApiError::from(db_err),
            ServiceError::Auth(auth_err) => crate::ApiError::from(auth_err),
            ServiceError::Integration(integration_err) => crate::ApiError::from(integration_err),
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err)
    }
}

impl From<skillswap_auth::AuthError> for ServiceError {
    fn from(err: skillswap_auth::AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<IntegrationError> for ServiceError {
    fn from(err: IntegrationError) -> Self {
        Self::Integration(err)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
