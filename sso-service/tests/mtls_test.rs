mod common;

use common::{TestApp, TestCa};
use sso_service::grpc::proto::auth::{auth_client::AuthClient, RegisterTenantRequest};
use tonic::transport::Channel;

fn tenant_req() -> RegisterTenantRequest {
    RegisterTenantRequest {
        name: "acme".to_string(),
        secret: "s3cr3t".to_string(),
    }
}

/// True when the server refused the connection or the first call on it.
async fn rejected(channel: Result<Channel, tonic::transport::Error>) -> bool {
    match channel {
        Err(_) => true,
        Ok(channel) => AuthClient::new(channel)
            .register_tenant(tenant_req())
            .await
            .is_err(),
    }
}

#[tokio::test]
async fn test_trusted_client_is_served() {
    let app = TestApp::spawn_mutual_tls().await;
    let identity = app.ca.as_ref().unwrap().issue_client();

    let channel = app.tls_channel(Some(identity)).await.unwrap();
    let tenant_id = AuthClient::new(channel)
        .register_tenant(tenant_req())
        .await
        .unwrap()
        .into_inner()
        .tenant_id;

    assert!(!tenant_id.is_empty());
    assert_eq!(app.storage.calls(), 1);
}

#[tokio::test]
async fn test_client_from_untrusted_ca_is_rejected_before_dispatch() {
    let app = TestApp::spawn_mutual_tls().await;
    let rogue = TestCa::new("rogue ca");

    let channel = app.tls_channel(Some(rogue.issue_client())).await;

    assert!(rejected(channel).await);
    assert_eq!(app.storage.calls(), 0);
}

#[tokio::test]
async fn test_client_without_certificate_is_rejected() {
    let app = TestApp::spawn_mutual_tls().await;

    let channel = app.tls_channel(None).await;

    assert!(rejected(channel).await);
    assert_eq!(app.storage.calls(), 0);
}

#[tokio::test]
async fn test_plaintext_client_is_rejected() {
    let app = TestApp::spawn_mutual_tls().await;

    let channel = Channel::from_shared(format!("http://127.0.0.1:{}", app.grpc_port))
        .unwrap()
        .connect()
        .await;

    assert!(rejected(channel).await);
    assert_eq!(app.storage.calls(), 0);
}
