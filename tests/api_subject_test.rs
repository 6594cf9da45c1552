//! Tests for subject upload, export, share and delete.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestApp};
use factory_tint::{PixelBuffer, TargetColor, Watermark};
use pretty_assertions::assert_eq;
use refinish::assets::AssetLoader;
use refinish::models::AppConfig;

fn embedded_config() -> AppConfig {
    AppConfig::load_from_assets(&AssetLoader::new(None, None))
}

#[tokio::test]
async fn test_upload_returns_subject() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/subjects", fixtures::subject_png(40, 20))
        .await;

    common::assert_status(&response, StatusCode::CREATED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["id"].as_str().unwrap().len(), 16);
    assert_eq!(json["width"], 40);
    assert_eq!(json["height"], 20);
    assert_eq!(json["has_transparency"], true);

    let uploaded_at = json["uploaded_at"].as_str().unwrap();
    let uploaded_at = chrono::DateTime::parse_from_rfc3339(uploaded_at).unwrap();
    let age = chrono::Utc::now().signed_duration_since(uploaded_at);
    assert!(age >= chrono::Duration::zero() && age < chrono::Duration::minutes(1));
}

#[tokio::test]
async fn test_upload_is_content_addressed() {
    let app = TestApp::new();

    let first = app.upload(fixtures::subject_png(40, 20)).await;
    let second = app.upload(fixtures::subject_png(40, 20)).await;
    let other = app.upload(fixtures::subject_png(41, 20)).await;

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(app.subjects.len().await, 2);
}

#[tokio::test]
async fn test_upload_rejects_garbage() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/subjects", b"definitely not an image".to_vec())
        .await;
    common::assert_json_error(&response, StatusCode::BAD_REQUEST);

    let response = app.post_bytes("/api/subjects", Vec::new()).await;
    common::assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_respects_body_limit() {
    let mut config = AppConfig::default();
    config.engine.max_upload_bytes = 64;
    let app = TestApp::with_config(config, None);

    let response = app
        .post_bytes("/api/subjects", fixtures::subject_png(40, 20))
        .await;
    common::assert_status(&response, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_upload_is_bounded_to_max_dimension() {
    let mut config = AppConfig::default();
    config.engine.max_dimension = 200;
    config.engine.isolation_max_dimension = 150;
    let app = TestApp::with_config(config, None);

    // Cut-out subjects are bounded by max_dimension
    let response = app
        .post_bytes("/api/subjects", fixtures::subject_png(300, 100))
        .await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["width"], 200);
    assert_eq!(json["height"], 67);

    // Opaque photos are bounded for isolation first
    let response = app
        .post_bytes(
            "/api/subjects",
            fixtures::opaque_png(300, 100, [90, 90, 200, 255]),
        )
        .await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["width"], 150);
    assert_eq!(json["height"], 50);
    assert_eq!(json["has_transparency"], false);
}

#[tokio::test]
async fn test_image_without_color_is_original() {
    let app = TestApp::new();
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app.get(&format!("/api/subjects/{id}/image")).await;

    let image = common::assert_png(&response);
    assert_eq!(image, fixtures::subject(40, 20));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"filter-original.png\"")
    );
}

#[tokio::test]
async fn test_image_paints_swatch() {
    let app = TestApp::new();
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app
        .get(&format!("/api/subjects/{id}/image?color=Industrial%20Blue"))
        .await;

    let image = common::assert_png(&response);
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"filter-industrial-blue.png\"")
    );

    let blue: TargetColor = "#0047AB".parse().unwrap();
    let expected = embedded_config()
        .recolorer()
        .recolor(&fixtures::subject(40, 20), blue)
        .unwrap();
    assert_eq!(image, expected);

    // Background stays transparent, highlights stay untouched, the body is painted
    assert_eq!(image.pixel(0, 5)[3], 0);
    assert_eq!(image.pixel(20, 0), fixtures::HIGHLIGHT);
    assert_ne!(image.pixel(20, 10), fixtures::BODY);
    assert!(image.alpha_matches(&fixtures::subject(40, 20)));
}

#[tokio::test]
async fn test_image_custom_hex_color() {
    let app = TestApp::new();
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app
        .get(&format!("/api/subjects/{id}/image?color=%23123456"))
        .await;

    common::assert_png(&response);
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"filter-custom.png\"")
    );
}

#[tokio::test]
async fn test_image_errors() {
    let app = TestApp::new();
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app.get("/api/subjects/0000000000000000/image").await;
    common::assert_json_error(&response, StatusCode::NOT_FOUND);

    let response = app
        .get(&format!("/api/subjects/{id}/image?color=%2312"))
        .await;
    common::assert_json_error(&response, StatusCode::BAD_REQUEST);

    let response = app
        .get(&format!("/api/subjects/{id}/image?color=Sunset%20Mauve"))
        .await;
    common::assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watermark_is_drawn_behind_subject() {
    let mark = Watermark::new(PixelBuffer::filled(8, 8, [0, 0, 0, 255]).unwrap());
    let app = TestApp::with_config(AppConfig::default(), Some(mark));

    // Fully transparent canvas so the mark is visible everywhere it lands
    let canvas = PixelBuffer::filled(20, 20, [0, 0, 0, 0]).unwrap();
    let id = app.upload(fixtures::png(&canvas)).await;

    let response = app.get(&format!("/api/subjects/{id}/image")).await;
    let marked = common::assert_png(&response);
    assert_eq!(marked.pixel(10, 10)[3], 38); // 0.15 * 255
    assert_eq!(marked.pixel(0, 0)[3], 0);

    let response = app
        .get(&format!("/api/subjects/{id}/image?watermark=false"))
        .await;
    let plain = common::assert_png(&response);
    assert_eq!(plain.pixel(10, 10)[3], 0);
}

#[tokio::test]
async fn test_share_payload() {
    let app = TestApp::new();
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app
        .get(&format!("/api/subjects/{id}/share?color=%23CC0000"))
        .await;

    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["filename"], "filter-ferrari-red.png");
    assert_eq!(json["title"], "Factory Paint");
    assert_eq!(json["text"], "Look at this factory finish! Color: Ferrari Red");
    assert_eq!(
        json["image_url"],
        format!("/api/subjects/{id}/image?color=%23cc0000")
    );
}

#[tokio::test]
async fn test_share_names_unknown_colors_custom() {
    let app = TestApp::new();
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app
        .get(&format!("/api/subjects/{id}/share?color=%23010203"))
        .await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["text"], "Look at this factory finish! Color: Custom");
    assert_eq!(json["filename"], "filter-custom.png");

    let response = app.get(&format!("/api/subjects/{id}/share")).await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["text"], "Look at this factory finish! Color: Original");
    assert_eq!(
        json["image_url"],
        format!("/api/subjects/{id}/image?color=transparent")
    );
}

#[tokio::test]
async fn test_share_without_message_is_trimmed() {
    let app = TestApp::with_config(AppConfig::default(), None);
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app
        .get(&format!("/api/subjects/{id}/share?color=transparent"))
        .await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["text"], "Color: Original");
}

#[tokio::test]
async fn test_delete_subject() {
    let app = TestApp::new();
    let id = app.upload(fixtures::subject_png(40, 20)).await;

    let response = app.delete(&format!("/api/subjects/{id}")).await;
    common::assert_status(&response, StatusCode::NO_CONTENT);

    let response = app.get(&format!("/api/subjects/{id}/image")).await;
    common::assert_json_error(&response, StatusCode::NOT_FOUND);

    let response = app.delete(&format!("/api/subjects/{id}")).await;
    common::assert_json_error(&response, StatusCode::NOT_FOUND);
}
