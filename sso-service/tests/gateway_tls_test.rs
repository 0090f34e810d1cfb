mod common;

use common::{TestApp, TestCa};

fn register_tenant_request() -> String {
    let body = r#"{"name":"acme","secret":"s3cr3t"}"#;
    format!(
        "POST /v1/tenants HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

fn was_served(result: &std::io::Result<String>) -> bool {
    matches!(result, Ok(response) if response.starts_with("HTTP/1.1"))
}

#[tokio::test]
async fn test_gateway_serves_trusted_client() {
    let app = TestApp::spawn_mutual_tls().await;
    let identity = app.ca.as_ref().unwrap().issue_client();

    let response = app
        .gateway_exchange(Some(identity), register_tenant_request())
        .await
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 201"), "{response}");
    assert!(response.contains("tenant_id"));
    assert_eq!(app.storage.calls(), 1);
}

#[tokio::test]
async fn test_gateway_refuses_client_from_untrusted_ca() {
    let app = TestApp::spawn_mutual_tls().await;
    let rogue = TestCa::new("rogue ca");

    let result = app
        .gateway_exchange(Some(rogue.issue_client()), register_tenant_request())
        .await;

    assert!(!was_served(&result));
    assert_eq!(app.storage.calls(), 0);
}

#[tokio::test]
async fn test_gateway_refuses_client_without_certificate() {
    let app = TestApp::spawn_mutual_tls().await;

    let result = app.gateway_exchange(None, register_tenant_request()).await;

    assert!(!was_served(&result));
    assert_eq!(app.storage.calls(), 0);
}
