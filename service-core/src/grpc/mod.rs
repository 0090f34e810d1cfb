//! gRPC utilities shared by service binaries.
//!
//! This module provides:
//! - Error conversion from `AppError` to `tonic::Status`
//! - A request-ID interceptor
//! - Health check service implementation
//! - Server builder utilities

pub mod error;
pub mod health;
pub mod interceptors;
pub mod server;

pub use error::{GrpcResult, IntoStatus};
pub use health::{HealthComponents, HealthReporter, create_health_service};
pub use interceptors::{REQUEST_ID_KEY, extract_request_id, request_id_interceptor};
pub use server::{GrpcServerBuilder, create_reflection_service};

// Re-export commonly used tonic types
pub use tonic::{Code, Request, Response, Status};
