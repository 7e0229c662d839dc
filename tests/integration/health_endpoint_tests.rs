//! Integration tests for the HTTP health endpoint.
//!
//! Validates that `GET /health` returns `200 OK` with body `"ok"`.
//! Uses an ephemeral port to avoid conflicts with running instances.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use group_organizer::health::serve_health;

/// Spawn the health server on a free port, returning its base URL.
///
/// Caller must cancel `ct` to shut the server down.
async fn spawn_server() -> (String, CancellationToken, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let handle = tokio::spawn(async move {
        let _ = serve_health(port, server_ct).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    (format!("http://127.0.0.1:{port}"), ct, handle)
}

#[tokio::test]
async fn health_returns_ok() {
    let (base_url, ct, _handle) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("HTTP GET /health");

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("body");
    assert_eq!(body, "ok");
    ct.cancel();
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (base_url, ct, _handle) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/nope"))
        .await
        .expect("HTTP GET /nope");

    assert_eq!(resp.status(), 404);
    ct.cancel();
}

#[tokio::test]
async fn server_stops_on_cancellation() {
    let (_base_url, ct, handle) = spawn_server().await;

    ct.cancel();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("server exits after cancellation")
        .expect("server task does not panic");
}
