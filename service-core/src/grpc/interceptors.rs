//! gRPC interceptors for cross-cutting concerns.

use tonic::{Request, Status};

/// gRPC metadata key for request ID.
pub const REQUEST_ID_KEY: &str = "x-request-id";

/// Interceptor that logs the caller's request ID, if one was sent.
#[allow(clippy::result_large_err)]
pub fn request_id_interceptor(request: Request<()>) -> Result<Request<()>, Status> {
    if let Some(request_id) = extract_request_id(&request) {
        tracing::debug!(request_id = %request_id, "Received gRPC request");
    }

    Ok(request)
}

/// Extract request ID from incoming gRPC request metadata.
pub fn extract_request_id<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(REQUEST_ID_KEY)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
