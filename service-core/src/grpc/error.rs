//! Error conversion from `AppError` to `tonic::Status`.
//!
//! | AppError | gRPC Status |
//! |----------|-------------|
//! | `ValidationError`, `InvalidArgument`, `BadRequest` | `INVALID_ARGUMENT` |
//! | `NotFound` | `NOT_FOUND` |
//! | `Conflict` | `ALREADY_EXISTS` |
//! | `InternalError`, `DatabaseError`, `ConfigError` | `INTERNAL` |
//!
//! The gateway uses `AppError::status_code` for the same table, so both
//! transports agree on every category.

use tonic::Status;

use crate::error::AppError;

/// Extension trait for converting types into `tonic::Status`.
pub trait IntoStatus {
    /// Convert into a `tonic::Status`.
    fn into_status(self) -> Status;
}

impl IntoStatus for AppError {
    fn into_status(self) -> Status {
        let message = self.public_message();
        match self {
            AppError::ValidationError(_) | AppError::InvalidArgument(_) | AppError::BadRequest(_) => {
                Status::invalid_argument(message)
            }
            AppError::NotFound(_) => Status::not_found(message),
            AppError::Conflict(_) => Status::already_exists(message),
            AppError::InternalError(err) | AppError::DatabaseError(err) | AppError::ConfigError(err) => {
                // Log the full error but don't expose it to clients
                tracing::error!(error = %err, "Internal error");
                Status::internal(message)
            }
        }
    }
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        err.into_status()
    }
}

/// Result type alias for gRPC handlers.
pub type GrpcResult<T> = Result<tonic::Response<T>, Status>;
