//! Request and response shapes shared by the gRPC service and the JSON gateway.
//!
//! Both transports build these structs and run the same `validator` rules, so
//! an empty or malformed field is rejected identically before any service call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        // Reported by the `length` rule
        return Ok(());
    }
    Uuid::parse_str(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("uuid");
        err.message = Some("must be a valid UUID".into());
        err
    })
}

/// Parse an identifier that has already passed `validate_uuid`.
pub(crate) fn parse_id(value: &str) -> Result<Uuid, service_core::error::AppError> {
    Uuid::parse_str(value).map_err(|_| {
        service_core::error::AppError::InvalidArgument(format!("invalid identifier: {}", value))
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(
        length(min = 1, message = "tenant_id is required"),
        custom(function = "validate_uuid")
    )]
    pub tenant_id: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(
        length(min = 1, message = "tenant_id is required"),
        custom(function = "validate_uuid")
    )]
    pub tenant_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct IsAdminRequest {
    #[validate(
        length(min = 1, message = "user_id is required"),
        custom(function = "validate_uuid")
    )]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterTenantRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "secret is required"))]
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterTenantResponse {
    pub tenant_id: String,
}
