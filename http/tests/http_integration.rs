//! Integration tests for the HTTP adapter.
//!
//! Each test runs the full path: request building → reqwest send → status
//! check → body decode, against a wiremock server.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use settle_http::{HttpClient, HttpConfig, HttpError, is_http_error, send};
use settle_schema::{IssueKind, Schema, is_validation_failure};
use settle_types::{SystemError, is_error};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct User {
    id: String,
}

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&HttpConfig {
        base_url: Some(server.uri()),
        ..HttpConfig::default()
    })
    .unwrap()
}

fn user_schema() -> Schema<User> {
    Schema::new(&json!({
        "type": "object",
        "properties": { "id": { "type": "string" } },
        "required": ["id"]
    }))
    .unwrap()
}

#[tokio::test]
async fn success_settles_into_ok_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).get::<User>("/users/42").await;

    assert!(!is_error(&result));
    let response = result.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data, User { id: "42".into() });
}

#[tokio::test]
async fn error_status_settles_into_err_with_response_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "abc")
                .set_body_string(r#"{"error":"not found"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).get::<User>("/users/404").await;

    assert!(is_error(&result));
    let err = result.unwrap_err();
    assert!(is_http_error(&err));
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.body(), Some(r#"{"error":"not found"}"#));
    assert_eq!(
        err.headers()
            .and_then(|h| h.get("x-request-id"))
            .and_then(|v| v.to_str().ok()),
        Some("abc")
    );
}

#[tokio::test]
async fn error_body_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(100)))
        .mount(&server)
        .await;

    let client = HttpClient::new(&HttpConfig {
        base_url: Some(server.uri()),
        max_error_body_bytes: Some(10),
        ..HttpConfig::default()
    })
    .unwrap();

    let err = client.get::<Value>("/big").await.unwrap_err();
    assert_eq!(err.body(), Some("xxxxxxxxxx...(truncated)"));
}

#[tokio::test]
async fn connection_refused_settles_into_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = HttpClient::new(&HttpConfig {
        base_url: Some(format!("http://127.0.0.1:{port}")),
        ..HttpConfig::default()
    })
    .unwrap();

    let result = client.get::<Value>("/anything").await;

    let err = result.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn undecodable_body_settles_into_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get::<User>("/users/1")
        .await
        .unwrap_err();
    assert!(err.is_decode());
    assert_eq!(err.body(), Some("<html>oops</html>"));
}

#[tokio::test]
async fn empty_body_decodes_as_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/42"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .delete::<Option<User>>("/users/42")
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.data, None);
}

#[tokio::test]
async fn post_put_patch_send_json_bodies() {
    let server = MockServer::start().await;
    for verb in ["POST", "PUT", "PATCH"] {
        Mock::given(method(verb))
            .and(path("/users"))
            .and(body_json(json!({"id": "7"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "7"})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let body = User { id: "7".into() };

    let posted = client.post::<_, User>("/users", &body).await.unwrap();
    let put = client.put::<_, User>("/users", &body).await.unwrap();
    let patched = client.patch::<_, User>("/users", &body).await.unwrap();

    for response in [posted, put, patched] {
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.data, body);
    }
}

#[tokio::test]
async fn configured_headers_and_user_agent_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("x-api-key", "secret"))
        .and(header("user-agent", "settle-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = BTreeMap::new();
    headers.insert("x-api-key".to_string(), "secret".to_string());
    let client = HttpClient::new(&HttpConfig {
        base_url: Some(server.uri()),
        user_agent: Some("settle-test/1.0".to_string()),
        headers,
        ..HttpConfig::default()
    })
    .unwrap();

    let response = client.get::<bool>("/ping").await.unwrap();
    assert!(response.data);
}

#[tokio::test]
async fn https_only_refuses_plain_http() {
    let server = MockServer::start().await;
    let client = HttpClient::new(&HttpConfig {
        base_url: Some(server.uri()),
        https_only: true,
        ..HttpConfig::default()
    })
    .unwrap();

    let err = client.get::<Value>("/x").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn validated_get_passes_schema_failures_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 123})))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .get_validated("/users/bad", &user_schema())
        .await
        .unwrap();

    assert!(is_validation_failure(&response.data));
    let report = response.data.failure_report().unwrap();
    assert_eq!(report.issues()[0].kind, IssueKind::Schema);
}

#[tokio::test]
async fn validated_get_decodes_matching_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .get_validated("/users/42", &user_schema())
        .await
        .unwrap();

    assert_eq!(response.data.ok(), Some(User { id: "42".into() }));
}

#[tokio::test]
async fn validated_get_reports_malformed_json_as_syntax() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": "))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .get_validated("/users/42", &user_schema())
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let report = response.data.failure_report().unwrap();
    assert_eq!(report.issues().len(), 1);
    assert_eq!(report.issues()[0].kind, IssueKind::Syntax);
}

#[tokio::test]
async fn validated_get_reports_type_mismatch_as_coercion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .mount(&server)
        .await;

    let loose: Schema<User> = Schema::new(&json!({"type": "object"})).unwrap();
    let response = client_for(&server)
        .get_validated("/users/42", &loose)
        .await
        .unwrap();

    assert!(is_validation_failure(&response.data));
    let report = response.data.failure_report().unwrap();
    assert_eq!(report.issues()[0].kind, IssueKind::Coercion);
}

#[tokio::test]
async fn validated_get_keeps_status_errors_in_outer_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_validated("/users/42", &user_schema())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn error_body_cut_short_is_marked_incomplete() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        // Promise 100 bytes, send 7, hang up.
        stream
            .write_all(b"HTTP/1.1 502 Bad Gateway\r\ncontent-length: 100\r\n\r\npartial")
            .unwrap();
        stream.flush().unwrap();
    });

    let request = reqwest::Client::new().get(format!("http://{addr}/upstream"));
    let err = send(request, 1024).await.unwrap_err();
    server.join().unwrap();

    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    let body = err.body().unwrap();
    assert!(body.ends_with("...(incomplete)"), "body was {body:?}");
}

#[tokio::test]
async fn raw_send_settles_status_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418).set_body_string("short and stout"))
        .mount(&server)
        .await;

    let request = reqwest::Client::new().get(format!("{}/teapot", server.uri()));
    let err = send(request, 1024).await.unwrap_err();
    match err {
        HttpError::Status { status, body, .. } => {
            assert_eq!(status, StatusCode::IM_A_TEAPOT);
            assert_eq!(body, "short and stout");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn http_errors_collapse_into_system_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let result = client_for(&server).get::<Value>("/gone").await;
    let collapsed: Result<_, SystemError> = result.map_err(SystemError::from);
    let err = collapsed.unwrap_err();
    assert_eq!(err.code(), Some("410"));
    assert!(!is_http_error(&err));
}
