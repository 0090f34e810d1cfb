use service_core::error::AppError;
use thiserror::Error;

/// Closed set of outcomes the credential service reports to its callers.
///
/// `Internal` carries the cause for operators; transports only ever show the
/// category.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("tenant not found")]
    InvalidTenant,

    #[error("user already exists")]
    UserExists,

    #[error("tenant already exists")]
    TenantExists,

    #[error("user not found")]
    UserNotFound,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::BadRequest(anyhow::anyhow!("invalid email or password")),
            AuthError::InvalidTenant => AppError::NotFound(anyhow::anyhow!("tenant not found")),
            AuthError::UserExists => AppError::Conflict(anyhow::anyhow!("user already exists")),
            AuthError::TenantExists => AppError::Conflict(anyhow::anyhow!("tenant already exists")),
            AuthError::UserNotFound => AppError::NotFound(anyhow::anyhow!("user not found")),
            AuthError::Internal(e) => AppError::InternalError(e),
        }
    }
}
