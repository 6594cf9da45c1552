//! Server integration tests that test the actual server behavior.
//!
//! These tests start a real TCP server and talk raw HTTP/1.1 to it.

mod common;

use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use refinish::assets::AssetLoader;
use refinish::server::{build_router, create_app_state};

/// Start a test server on an available port and return the port number.
async fn start_test_server() -> u16 {
    let asset_loader = Arc::new(AssetLoader::new(None, None));
    let state = create_app_state(asset_loader).expect("Failed to create app state");
    let app = build_router(state);

    // Bind to port 0 to get an available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    port
}

/// Send one request with `Connection: close` and read the whole response.
async fn roundtrip(port: u16, head: &str, body: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}"))
        .await
        .expect("Failed to connect");

    stream
        .write_all(head.as_bytes())
        .await
        .expect("Failed to write request head");
    stream.write_all(body).await.expect("Failed to write body");

    let mut response = Vec::new();
    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        stream.read_to_end(&mut response),
    )
    .await
    .expect("Server did not finish the response")
    .expect("Failed to read response");
    response
}

#[tokio::test]
async fn test_health_over_tcp() {
    let port = start_test_server().await;

    let response = roundtrip(
        port,
        "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        &[],
    )
    .await;

    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert!(response.ends_with("OK"), "got: {response}");
}

#[tokio::test]
async fn test_upload_over_tcp() {
    let port = start_test_server().await;
    let image = common::fixtures::subject_png(40, 20);

    let head = format!(
        "POST /api/subjects HTTP/1.1\r\nHost: localhost\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        image.len()
    );
    let response = roundtrip(port, &head, &image).await;

    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 201"), "got: {response}");
    assert!(response.contains("\"width\":40"), "got: {response}");
    assert!(response.contains("\"has_transparency\":true"), "got: {response}");
}
