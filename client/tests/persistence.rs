//! End-to-end tests: HTTP client plus file storage, across client restarts.

#![allow(clippy::unwrap_used)]

use auth_store::{AuthClient, ClientConfig, Credentials, RequestStatus, UserId};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "name": "Jane",
            "phoneNumber": "+7(999) 123-45-67",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_session_survives_restart_until_logout() {
    let server = server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap()).with_storage_dir(dir.path());

    let first = AuthClient::from_config(&config).unwrap();
    first
        .login(Credentials::new("+7(999) 123-45-67", "Passw0rd1"))
        .await
        .unwrap();

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("userInfo.json")).unwrap()).unwrap();
    assert_eq!(
        stored,
        json!({"id": "u1", "name": "Jane", "phoneNumber": "+7(999) 123-45-67"})
    );

    // A fresh client sees the persisted session without any request.
    let second = AuthClient::from_config(&config).unwrap();
    let session = second.session().await;
    assert_eq!(session.basic_identity.map(|i| i.id), Some(UserId::new("u1")));
    assert_eq!(session.status, RequestStatus::Idle);

    tokio_test::assert_ok!(second.logout().await);
    assert!(!dir.path().join("userInfo.json").exists());

    let third = AuthClient::from_config(&config).unwrap();
    assert!(!third.session().await.is_authenticated());
}

#[tokio::test]
async fn test_failed_logout_keeps_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "name": "Jane",
            "phoneNumber": "+7(999) 123-45-67",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap()).with_storage_dir(dir.path());
    let client = AuthClient::from_config(&config).unwrap();

    client
        .login(Credentials::new("+7(999) 123-45-67", "Passw0rd1"))
        .await
        .unwrap();
    let err = client.logout().await.unwrap_err();

    assert_eq!(err.to_string(), "Logout failed");
    assert!(dir.path().join("userInfo.json").exists());
    assert!(client.session().await.is_authenticated());
}
