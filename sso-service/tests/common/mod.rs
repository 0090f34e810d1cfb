//! Test helper module for sso-service integration tests.
//!
//! Spawns the real gRPC server on an ephemeral port over in-memory storage,
//! optionally behind mutual TLS with certificates minted by `rcgen`. With TLS
//! the gateway listens on a second ephemeral port.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Duration as TokenTtl;
use rcgen::{
    BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    KeyUsagePurpose,
};
use sso_service::{
    build_router,
    config::TlsMode,
    grpc::proto::auth::auth_client::AuthClient,
    models::{Tenant, User},
    server::{serve_gateway, serve_grpc},
    services::{AuthService, TokenIssuer},
    storage::{
        MemoryStorage, StorageError, TenantProvider, TenantSaver, UserProvider, UserSaver,
    },
    tls::{install_crypto_provider, TlsContext},
    AppState,
};
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Identity};
use uuid::Uuid;

/// In-memory storage that counts every port call.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    calls: AtomicUsize,
}

impl CountingStorage {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_admin(&self, user_id: Uuid, is_admin: bool) {
        self.inner.set_admin(user_id, is_admin).unwrap();
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserSaver for CountingStorage {
    async fn save_user(
        &self,
        email: &str,
        pass_hash: &str,
        tenant_id: Uuid,
    ) -> Result<Uuid, StorageError> {
        self.hit();
        self.inner.save_user(email, pass_hash, tenant_id).await
    }
}

#[async_trait]
impl UserProvider for CountingStorage {
    async fn find_user_by_email(&self, email: &str) -> Result<User, StorageError> {
        self.hit();
        self.inner.find_user_by_email(email).await
    }

    async fn is_admin_flag(&self, user_id: Uuid) -> Result<bool, StorageError> {
        self.hit();
        self.inner.is_admin_flag(user_id).await
    }
}

#[async_trait]
impl TenantSaver for CountingStorage {
    async fn save_tenant(&self, name: &str, secret: &str) -> Result<Uuid, StorageError> {
        self.hit();
        self.inner.save_tenant(name, secret).await
    }
}

#[async_trait]
impl TenantProvider for CountingStorage {
    async fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Tenant, StorageError> {
        self.hit();
        self.inner.find_tenant_by_id(tenant_id).await
    }
}

/// A certificate authority plus the PEM material it has issued.
pub struct TestCa {
    cert: rcgen::Certificate,
    key: KeyPair,
}

impl TestCa {
    pub fn new(name: &str) -> Self {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.distinguished_name.push(DnType::CommonName, name);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        Self { cert, key }
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }

    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    /// Issue a `localhost` leaf certificate, returning `(cert_pem, key_pem)`.
    pub fn issue(&self, purpose: ExtendedKeyUsagePurpose) -> (String, String) {
        let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
        params.extended_key_usages = vec![purpose];
        let key = KeyPair::generate().unwrap();
        let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
        (cert.pem(), key.serialize_pem())
    }

    pub fn issue_server(&self) -> (String, String) {
        self.issue(ExtendedKeyUsagePurpose::ServerAuth)
    }

    pub fn issue_client(&self) -> (String, String) {
        self.issue(ExtendedKeyUsagePurpose::ClientAuth)
    }
}

/// Test application with running gRPC server.
pub struct TestApp {
    pub grpc_port: u16,
    pub gateway_port: Option<u16>,
    pub state: AppState,
    pub storage: Arc<CountingStorage>,
    pub ca: Option<TestCa>,
    shutdown: CancellationToken,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl TestApp {
    /// Spawn a plaintext server.
    pub async fn spawn() -> Self {
        Self::start(None).await
    }

    /// Spawn a server requiring client certificates issued by a fresh CA.
    pub async fn spawn_mutual_tls() -> Self {
        install_crypto_provider();

        let ca = TestCa::new("sso test ca");
        let (cert, key) = ca.issue_server();
        let tls = TlsContext::from_pem(
            TlsMode::Mutual,
            cert.into_bytes(),
            key.into_bytes(),
            Some(ca.pem().into_bytes()),
        )
        .expect("Failed to build TLS context");

        let mut app = Self::start(Some(tls)).await;
        app.ca = Some(ca);
        app
    }

    async fn start(tls: Option<TlsContext>) -> Self {
        let storage = Arc::new(CountingStorage::default());
        let auth_service =
            AuthService::with_storage(storage.clone(), TokenIssuer::default(), TokenTtl::hours(1));

        let state = AppState {
            service_name: "sso-service-test".to_string(),
            service_version: "test".to_string(),
            auth_service: Arc::new(auth_service),
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let grpc_port = listener.local_addr().unwrap().port();

        let shutdown = CancellationToken::new();

        let mut gateway_port = None;
        if let Some(tls) = tls.clone() {
            let gateway_listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind gateway port");
            gateway_port = Some(gateway_listener.local_addr().unwrap().port());

            let router = build_router(state.clone());
            let gateway_shutdown = shutdown.clone();
            tokio::spawn(async move {
                let _ = serve_gateway(router, gateway_listener, &tls, gateway_shutdown).await;
            });
        }

        let server_state = state.clone();
        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = serve_grpc(
                server_state,
                listener,
                tls.as_ref(),
                Duration::from_secs(10),
                server_shutdown,
            )
            .await;
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestApp {
            grpc_port,
            gateway_port,
            state,
            storage,
            ca: None,
            shutdown,
        }
    }

    /// Gateway router sharing this app's service instance.
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Create a plaintext Auth client.
    pub async fn auth_client(&self) -> AuthClient<Channel> {
        AuthClient::connect(format!("http://127.0.0.1:{}", self.grpc_port))
            .await
            .expect("Failed to connect to gRPC server")
    }

    /// Open a TLS channel that trusts this app's CA, presenting `identity`
    /// as the client certificate when given.
    pub async fn tls_channel(
        &self,
        identity: Option<(String, String)>,
    ) -> Result<Channel, tonic::transport::Error> {
        let ca = self.ca.as_ref().expect("server was not started with TLS");

        let mut tls = ClientTlsConfig::new()
            .domain_name("localhost")
            .ca_certificate(Certificate::from_pem(ca.pem()));
        if let Some((cert, key)) = identity {
            tls = tls.identity(Identity::from_pem(cert, key));
        }

        Channel::from_shared(format!("https://127.0.0.1:{}", self.grpc_port))
            .unwrap()
            .tls_config(tls)?
            .connect()
            .await
    }

    /// Send a raw HTTP/1.1 request to the TLS gateway, presenting `identity`
    /// as the client certificate when given. Returns whatever the server
    /// wrote back before closing the connection.
    pub async fn gateway_exchange(
        &self,
        identity: Option<(String, String)>,
        request: String,
    ) -> std::io::Result<String> {
        let ca = self.ca.as_ref().expect("server was not started with TLS");
        let port = self.gateway_port.expect("gateway was not started");

        let mut roots = RootCertStore::empty();
        roots.add(ca.der()).unwrap();
        let builder = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_root_certificates(roots);
        let config = match identity {
            Some((cert_pem, key_pem)) => {
                let certs = rustls_pemfile::certs(&mut cert_pem.as_bytes())
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap();
                let key = rustls_pemfile::private_key(&mut key_pem.as_bytes())
                    .unwrap()
                    .unwrap();
                builder.with_client_auth_cert(certs, key).unwrap()
            }
            None => builder.with_no_client_auth(),
        };

        tokio::task::spawn_blocking(move || {
            let name = ServerName::try_from("localhost").unwrap();
            let conn = ClientConnection::new(Arc::new(config), name)
                .map_err(|e| std::io::Error::other(e))?;
            let sock = std::net::TcpStream::connect(("127.0.0.1", port))?;
            sock.set_read_timeout(Some(Duration::from_secs(5)))?;
            let mut tls = StreamOwned::new(conn, sock);

            tls.write_all(request.as_bytes())?;
            let mut response = Vec::new();
            match tls.read_to_end(&mut response) {
                Ok(_) => {}
                // Peer closed without close_notify after answering
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof && !response.is_empty() => {}
                Err(e) => return Err(e),
            }
            Ok(String::from_utf8_lossy(&response).into_owned())
        })
        .await
        .unwrap()
    }
}
