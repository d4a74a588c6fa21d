//! Integration tests for ValidationClient
//!
//! These tests run the client against a stub HTTP server on a local
//! TcpListener. The stub answers one request with a canned response and
//! hands the raw request head back to the test.

use smartsub_core::{HttpMethod, Tag};
use smartsub_network::{
    TagValidator, ValidationClient, ValidationClientConfig, ValidationClientError,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const BASE_PATH: &str = "/api/checkpoint-posto";

/// Start a stub that answers one request. Returns the base URL and a
/// receiver for the request head.
async fn stub_server(
    status: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (head_tx, head_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let _ = head_tx.send(String::from_utf8_lossy(&buf).into_owned());

        let response = format!(
            "HTTP/1.1 {status}\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    (format!("http://{addr}{BASE_PATH}"), head_rx)
}

fn client_for(base_url: String) -> ValidationClient {
    ValidationClient::new(ValidationClientConfig {
        base_url,
        timeout: Duration::from_millis(1000),
        use_system_proxy: false,
        ..ValidationClientConfig::default()
    })
    .unwrap()
}

fn tag(s: &str) -> Tag {
    Tag::new(s).unwrap()
}

/// `{"valid": true}` is an acceptance
#[tokio::test]
async fn test_json_valid_true_accepts() {
    let (url, _head) = stub_server("200 OK", r#"{"valid": true}"#).await;
    assert!(client_for(url).validate(&tag("AB12")).await);
}

/// Plain-text `OK` is an acceptance
#[tokio::test]
async fn test_plain_ok_accepts() {
    let (url, _head) = stub_server("200 OK", "OK").await;
    assert!(client_for(url).validate(&tag("AB12")).await);
}

/// 404 is a rejection regardless of body
#[tokio::test]
async fn test_not_found_rejects() {
    let (url, _head) = stub_server("404 Not Found", "OK").await;
    let client = client_for(url);

    let response = client.check(&tag("AB12")).await.unwrap();
    assert_eq!(response.status, 404);
    assert!(!response.accepted);
}

/// A 200 with none of the known fields is a rejection
#[tokio::test]
async fn test_unknown_json_rejects() {
    let (url, _head) = stub_server("200 OK", r#"{"foo":"bar"}"#).await;
    assert!(!client_for(url).validate(&tag("AB12")).await);
}

/// Default method is POST to `<base>/<tag>`
#[tokio::test]
async fn test_post_request_line() {
    let (url, head) = stub_server("200 OK", "ok").await;
    assert!(client_for(url).validate(&tag("E200-34_x")).await);

    let head = head.await.unwrap();
    assert!(
        head.starts_with(&format!("POST {BASE_PATH}/E200-34_x HTTP/1.1\r\n")),
        "unexpected request head: {head}"
    );
}

/// GET and static headers are honored
#[tokio::test]
async fn test_get_with_static_headers() {
    let (url, head) = stub_server("200 OK", r#"{"status":"success"}"#).await;

    let mut headers = BTreeMap::new();
    headers.insert("Authorization".to_string(), "Bearer t0k3n".to_string());
    let client = ValidationClient::new(ValidationClientConfig {
        base_url: url,
        method: HttpMethod::Get,
        timeout: Duration::from_millis(1000),
        headers,
        use_system_proxy: false,
    })
    .unwrap();

    assert!(client.validate(&tag("AB12")).await);

    let head = head.await.unwrap();
    assert!(head.starts_with(&format!("GET {BASE_PATH}/AB12 HTTP/1.1\r\n")));
    assert!(head.to_lowercase().contains("authorization: bearer t0k3n"));
}

/// A server that never answers is a timeout, and a rejection
#[tokio::test]
async fn test_timeout_rejects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let client = ValidationClient::new(ValidationClientConfig {
        base_url: format!("http://{addr}{BASE_PATH}"),
        timeout: Duration::from_millis(200),
        use_system_proxy: false,
        ..ValidationClientConfig::default()
    })
    .unwrap();

    let err = client.check(&tag("AB12")).await.unwrap_err();
    assert!(matches!(err, ValidationClientError::Timeout(200)));
    assert!(!client.validate(&tag("AB12")).await);
}

/// Nothing listening is a rejection, never a panic or an error
#[tokio::test]
async fn test_connection_refused_rejects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{addr}{BASE_PATH}"));
    assert!(matches!(
        client.check(&tag("AB12")).await,
        Err(ValidationClientError::Http(_))
    ));
    assert!(!client.validate(&tag("AB12")).await);
}
