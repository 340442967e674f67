use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use document_portal::services::mailer::{Mailer, MailerConfig};
use document_portal::{RelayState, create_relay_app};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Relay app pointed at a closed local port; validation failures never reach
/// the transport, and send attempts fail fast with a connection error.
fn setup_relay() -> axum::Router {
    let config = MailerConfig {
        smtp_host: "127.0.0.1".to_string(),
        smtp_port: 1,
        from_address: "portal@example.com".to_string(),
        tls: false,
        ..MailerConfig::default()
    };
    let mailer = Arc::new(Mailer::new(config).unwrap());
    create_relay_app(RelayState { mailer })
}

fn send_email_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/send-email")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let app = setup_relay();

    let bodies = [
        r#"{}"#,
        r#"{"name": "Ada"}"#,
        r#"{"name": "Ada", "email": "ada@example.com"}"#,
        r#"{"name": "", "email": "ada@example.com", "message": "hi"}"#,
        r#"{"name": "Ada", "email": "ada@example.com", "message": ""}"#,
    ];

    for body in bodies {
        let response = app.clone().oneshot(send_email_request(body)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expected 400 for body {body}"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Missing required fields");
    }
}

#[tokio::test]
async fn test_relay_failure_is_internal_error() {
    let app = setup_relay();

    let response = app
        .oneshot(send_email_request(
            r#"{"name": "Ada", "email": "ada@example.com", "message": "hello"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "Failed to send emails");
}
