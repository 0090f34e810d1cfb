use service_core::observability::logging::init_tracing;
use sso_service::{
    build_router,
    config::{SsoConfig, StorageBackend},
    server::{serve_gateway, serve_grpc},
    services::{AuthService, TokenIssuer},
    storage::{run_migrations, MemoryStorage, PgStorage},
    tls::{install_crypto_provider, TlsContext},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = SsoConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        storage = ?config.storage,
        "Starting SSO service"
    );

    install_crypto_provider();

    // Transport security is mandatory; bad material stops startup here
    let tls = TlsContext::load(&config.tls).map_err(|e| {
        tracing::error!(error = %e, "Failed to load TLS material");
        service_core::error::AppError::ConfigError(anyhow::anyhow!(e))
    })?;

    let issuer = TokenIssuer::default();
    let token_ttl = config.token.ttl()?;
    let auth_service = match config.storage {
        StorageBackend::Postgres => {
            let storage = PgStorage::connect(&config.database)
                .await
                .map_err(|e| service_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
            run_migrations(storage.pool())
                .await
                .map_err(|e| service_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
            AuthService::with_storage(Arc::new(storage), issuer, token_ttl)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            AuthService::with_storage(Arc::new(MemoryStorage::new()), issuer, token_ttl)
        }
    };

    let state = AppState {
        service_name: config.service_name.clone(),
        service_version: config.service_version.clone(),
        auth_service: Arc::new(auth_service),
    };

    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.common.grpc_port));
    let gateway_addr = SocketAddr::from(([0, 0, 0, 0], config.common.gateway_port));

    let grpc_listener = TcpListener::bind(grpc_addr).await.map_err(|e| {
        tracing::error!("Failed to bind gRPC listener to {}: {}", grpc_addr, e);
        e
    })?;

    let gateway_listener = TcpListener::bind(gateway_addr).await.map_err(|e| {
        tracing::error!("Failed to bind gateway listener to {}: {}", gateway_addr, e);
        e
    })?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let grpc_server = serve_grpc(
        state.clone(),
        grpc_listener,
        Some(&tls),
        config.grpc.timeout(),
        shutdown.clone(),
    );
    let gateway_server = serve_gateway(
        build_router(state),
        gateway_listener,
        &tls,
        shutdown.clone(),
    );

    // Run both servers concurrently; either one failing stops the other
    let result = tokio::try_join!(
        async {
            let res = grpc_server.await;
            if res.is_err() {
                shutdown.cancel();
            }
            res
        },
        async {
            let res = gateway_server.await;
            if res.is_err() {
                shutdown.cancel();
            }
            res
        },
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Server error");
        return Err(e);
    }

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
}
