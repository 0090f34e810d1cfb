//! Listener startup for the gRPC server and the JSON gateway.

use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use service_core::axum::Router;
use service_core::error::AppError;
use service_core::grpc::{
    create_health_service, create_reflection_service, request_id_interceptor, GrpcServerBuilder,
};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;

use crate::grpc::proto::auth::{auth_server::AuthServer, FILE_DESCRIPTOR_SET};
use crate::grpc::AuthServiceImpl;
use crate::tls::TlsContext;
use crate::AppState;

/// Name reported by the gRPC health service.
pub const GRPC_SERVICE_NAME: &str = "sso.auth.v1.Auth";

const GATEWAY_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Serve the Auth service on `listener` until `shutdown` fires.
///
/// Without a TLS context the server speaks plaintext; `main` always passes
/// one, tests may not.
pub async fn serve_grpc(
    state: AppState,
    listener: TcpListener,
    tls: Option<&TlsContext>,
    timeout: Duration,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let mut builder = GrpcServerBuilder::new(GRPC_SERVICE_NAME).with_timeout(timeout);
    if let Some(tls) = tls {
        builder = builder.with_tls(tls.grpc_tls_config());
    }

    let mut server = builder
        .build_server()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid gRPC TLS config: {}", e)))?;

    let health = create_health_service(GRPC_SERVICE_NAME).await;
    let mut reporter = health.reporter;

    let reflection = create_reflection_service(&[FILE_DESCRIPTOR_SET]).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to build reflection service: {}", e))
    })?;

    let auth = AuthServer::with_interceptor(AuthServiceImpl::new(state), request_id_interceptor);

    let addr = listener.local_addr()?;
    tracing::info!(
        address = %addr,
        tls = builder.tls_enabled(),
        "gRPC server listening"
    );

    let drain = shutdown.clone();
    let result = server
        .add_service(health.server)
        .add_service(reflection)
        .add_service(auth)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            drain.cancelled().await;
            reporter.set_not_serving().await;
        })
        .await;

    result.map_err(|e| AppError::InternalError(anyhow::anyhow!("gRPC server error: {}", e)))
}

/// Serve the JSON gateway over TLS on `listener` until `shutdown` fires.
pub async fn serve_gateway(
    router: Router,
    listener: TcpListener,
    tls: &TlsContext,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let rustls = RustlsConfig::from_config(tls.rustls_config());

    let handle = axum_server::Handle::new();
    let drain = handle.clone();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        drain.graceful_shutdown(Some(GATEWAY_DRAIN_TIMEOUT));
    });

    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, mode = ?tls.mode(), "Gateway listening");

    axum_server::from_tcp_rustls(listener.into_std()?, rustls)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}
