//! Transport security bootstrap.
//!
//! Loads the server certificate chain, its private key and, in mutual mode,
//! the client CA bundle. The resulting [`TlsContext`] is built once at startup
//! and handed to both listeners, so the gRPC server and the JSON gateway
//! always enforce the same posture. Any unreadable or unparseable material is
//! an error; there is no plaintext fallback.

use std::io::BufReader;
use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use thiserror::Error;
use tonic::transport::{Certificate, Identity, ServerTlsConfig};

use crate::config::{TlsConfig, TlsMode};

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {what} from {path}: {source}")]
    Read {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("no certificates found in {0}")]
    NoCertificates(&'static str),

    #[error("no private key found")]
    NoPrivateKey,

    #[error("client CA bundle is required for mutual TLS")]
    MissingClientCa,

    #[error("invalid client CA certificate: {0}")]
    InvalidClientCa(rustls::Error),

    #[error("failed to build client verifier: {0}")]
    Verifier(#[from] rustls::server::VerifierBuilderError),

    #[error("invalid server TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

const SERVER_CERT: &str = "server certificate";
const SERVER_KEY: &str = "server private key";
const CLIENT_CA: &str = "client CA bundle";

/// Immutable transport-security material shared by both listeners.
#[derive(Clone)]
pub struct TlsContext {
    mode: TlsMode,
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
    client_ca_pem: Option<Vec<u8>>,
    server_config: Arc<ServerConfig>,
}

impl std::fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsContext")
            .field("mode", &self.mode)
            .field("client_ca", &self.client_ca_pem.is_some())
            .finish_non_exhaustive()
    }
}

impl TlsContext {
    /// Read PEM material from the configured paths.
    pub fn load(config: &TlsConfig) -> Result<Self, TlsError> {
        let cert_pem = read(SERVER_CERT, &config.cert_path)?;
        let key_pem = read(SERVER_KEY, &config.key_path)?;

        let client_ca_pem = match config.mode {
            TlsMode::Mutual => {
                let path = config
                    .client_ca_path
                    .as_deref()
                    .ok_or(TlsError::MissingClientCa)?;
                Some(read(CLIENT_CA, path)?)
            }
            TlsMode::Server => None,
        };

        let context = Self::from_pem(config.mode, cert_pem, key_pem, client_ca_pem)?;

        tracing::info!(
            mode = ?config.mode,
            cert_path = %config.cert_path,
            client_ca_path = ?config.client_ca_path,
            "TLS material loaded"
        );

        Ok(context)
    }

    /// Build a context from PEM bytes already in memory.
    pub fn from_pem(
        mode: TlsMode,
        cert_pem: Vec<u8>,
        key_pem: Vec<u8>,
        client_ca_pem: Option<Vec<u8>>,
    ) -> Result<Self, TlsError> {
        let certs = parse_certs(SERVER_CERT, &cert_pem)?;
        let key = parse_key(&key_pem)?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ServerConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?;

        let client_ca_pem = match mode {
            TlsMode::Mutual => Some(client_ca_pem.ok_or(TlsError::MissingClientCa)?),
            TlsMode::Server => None,
        };

        let mut server_config = match &client_ca_pem {
            Some(ca_pem) => {
                let roots = client_roots(ca_pem)?;
                let verifier =
                    WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider).build()?;
                builder
                    .with_client_cert_verifier(verifier)
                    .with_single_cert(certs, key)?
            }
            None => builder.with_no_client_auth().with_single_cert(certs, key)?,
        };

        server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        Ok(Self {
            mode,
            cert_pem,
            key_pem,
            client_ca_pem,
            server_config: Arc::new(server_config),
        })
    }

    pub fn mode(&self) -> TlsMode {
        self.mode
    }

    /// Configuration for the tonic listener.
    pub fn grpc_tls_config(&self) -> ServerTlsConfig {
        let identity = Identity::from_pem(&self.cert_pem, &self.key_pem);
        let config = ServerTlsConfig::new().identity(identity);

        match &self.client_ca_pem {
            Some(ca_pem) => config.client_ca_root(Certificate::from_pem(ca_pem)),
            None => config,
        }
    }

    /// Configuration for the gateway listener.
    pub fn rustls_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

/// Install ring as the process-wide rustls provider.
///
/// tonic builds its own rustls config from the default provider, so this
/// must run before the gRPC listener starts. Calling it twice is harmless.
pub fn install_crypto_provider() {
    if CryptoProvider::get_default().is_none() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

fn read(what: &'static str, path: &str) -> Result<Vec<u8>, TlsError> {
    std::fs::read(path).map_err(|source| TlsError::Read {
        what,
        path: path.to_string(),
        source,
    })
}

fn parse_certs(what: &'static str, pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(pem))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Parse { what, source })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(what));
    }

    Ok(certs)
}

fn parse_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut BufReader::new(pem))
        .map_err(|source| TlsError::Parse {
            what: SERVER_KEY,
            source,
        })?
        .ok_or(TlsError::NoPrivateKey)
}

fn client_roots(pem: &[u8]) -> Result<RootCertStore, TlsError> {
    let mut roots = RootCertStore::empty();
    for cert in parse_certs(CLIENT_CA, pem)? {
        roots.add(cert).map_err(TlsError::InvalidClientCa)?;
    }
    Ok(roots)
}
