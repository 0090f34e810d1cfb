//! tonic server construction shared by service binaries.

use std::time::Duration;

use tonic::transport::{Server, ServerTlsConfig};
use tonic_reflection::server::Builder as ReflectionBuilder;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Collects transport settings before the tonic `Server` is created.
///
/// HTTP/2 keepalive is always on. TLS and the per-request deadline are opt-in.
pub struct GrpcServerBuilder {
    service_name: String,
    request_timeout: Option<Duration>,
    tls: Option<ServerTlsConfig>,
}

impl GrpcServerBuilder {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            request_timeout: None,
            tls: None,
        }
    }

    /// Deadline applied to every call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_tls(mut self, tls: ServerTlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Fails only when tonic rejects the TLS configuration.
    pub fn build_server(&self) -> Result<Server, tonic::transport::Error> {
        let mut server = Server::builder()
            .http2_keepalive_interval(Some(KEEPALIVE_INTERVAL))
            .http2_keepalive_timeout(Some(KEEPALIVE_TIMEOUT));

        if let Some(tls) = self.tls.clone() {
            server = server.tls_config(tls)?;
        }

        if let Some(timeout) = self.request_timeout {
            server = server.timeout(timeout);
        }

        tracing::debug!(
            service = %self.service_name,
            tls = self.tls_enabled(),
            timeout = ?self.request_timeout,
            "Built gRPC server"
        );

        Ok(server)
    }
}

/// Reflection service over the given encoded descriptor sets.
pub fn create_reflection_service(
    file_descriptor_sets: &[&[u8]],
) -> Result<
    tonic_reflection::server::ServerReflectionServer<
        impl tonic_reflection::server::ServerReflection,
    >,
    tonic_reflection::server::Error,
> {
    file_descriptor_sets
        .iter()
        .fold(ReflectionBuilder::configure(), |builder, fds| {
            builder.register_encoded_file_descriptor_set(fds)
        })
        .build_v1()
}
