//! HTTP surface tests, driving the router in-process

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use artifice_core::api::{router, AppState};
use artifice_core::{encoding, Settings};

fn app() -> (tempfile::TempDir, Router) {
    let tmp = tempfile::tempdir().unwrap();
    let settings = Settings {
        scratch_dir: tmp.path().join("qr"),
        ..Settings::default()
    };
    let state = AppState::new(settings).unwrap();
    (tmp, router(state))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn blank_png() -> String {
    let img = image::GrayImage::from_pixel(120, 120, image::Luma([255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    encoding::encode(buf.get_ref())
}

#[tokio::test]
async fn test_health_and_root() {
    let (_tmp, app) = app();
    let (status, body) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));

    let (status, _) = send(app.clone(), Method::HEAD, "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["debug"], false);
}

#[tokio::test]
async fn test_qr_generate_png() {
    let (_tmp, app) = app();
    let (status, body) = post(
        app,
        "/qr/generate",
        json!({"data": "https://example.com", "error_correction": "M"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["format"], "png");
    assert!(body["size"]["width"].as_u64().unwrap() > 0);
    assert!(!body["image"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_routes_also_under_api_v1() {
    let (_tmp, app) = app();
    let (status, body) = post(
        app,
        "/api/v1/qr/generate",
        json!({"data": "https://example.com", "output_format": "svg"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["size"].is_null());
    assert!(body["image"].as_str().unwrap().contains("<svg"));
}

#[tokio::test]
async fn test_structural_errors_carry_code() {
    let (_tmp, app) = app();
    let (status, body) = post(
        app.clone(),
        "/qr/generate",
        json!({"data": "x", "module_drawer": {"type": "circle"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "styled_image_required");
    assert!(body["message"].is_string());

    let (status, body) = post(
        app,
        "/qr/generate",
        json!({"data": "x", "output_format": "ascii", "final_size": 300}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "final_size_png_only");
}

#[tokio::test]
async fn test_schema_violations_are_validation_errors() {
    let (_tmp, app) = app();
    for bad in [
        json!({"data": "x", "fill_color": "#12"}),
        json!({"data": "x", "output_format": "tiff"}),
        json!({"data": "x", "box_size": 0}),
        json!({"data": ""}),
        json!({"nope": true}),
    ] {
        let (status, body) = post(app.clone(), "/qr/generate", bad.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert_eq!(body["code"], "validation_error", "{bad}");
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/hash/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scan_blank_image_is_404() {
    let (_tmp, app) = app();
    let (status, body) = post(app, "/qr/scan", json!({"image": blank_png()})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "no_qr_code_found");
}

#[tokio::test]
async fn test_scan_round_trip() {
    let (_tmp, app) = app();
    let (_, generated) = post(app.clone(), "/qr/generate", json!({"data": "round trip"})).await;
    let image = format!("data:image/png;base64,{}", generated["image"].as_str().unwrap());

    let (status, body) = post(app, "/qr/scan", json!({"image": image})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"codes": ["round trip"], "count": 1, "success": true}));
}

#[tokio::test]
async fn test_hash_generate_known_vector() {
    let (_tmp, app) = app();
    let (status, body) = post(app, "/hash/generate", json!({"data": "Hello, World!"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "hash": "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f",
            "algorithm": "sha256",
            "format": "hex",
        })
    );
}

#[tokio::test]
async fn test_hash_unknown_algorithm_lists_supported() {
    let (_tmp, app) = app();
    let (status, body) = post(app, "/hash/generate", json!({"data": "x", "algorithm": "whirlpool"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "unknown_algorithm");
    assert_eq!(body["context"]["supported"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_hash_verify_and_file() {
    let (_tmp, app) = app();
    let (_, generated) = post(app.clone(), "/hash/generate", json!({"data": "abc", "algorithm": "blake2s"})).await;

    let (status, body) = post(
        app.clone(),
        "/hash/verify",
        json!({"data": "abc", "expected_hash": generated["hash"], "algorithm": "blake2s"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, body) = post(
        app,
        "/hash/file",
        json!({"file_base64": "data:text/plain;base64,YWJj", "algorithm": "blake2s"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hash"], generated["hash"]);
    assert_eq!(body["file_size"], 3);
}

#[tokio::test]
async fn test_password_endpoints() {
    let (_tmp, app) = app();
    let (status, body) = post(app.clone(), "/password/generate", json!({"length": 24})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["password"].as_str().unwrap().chars().count(), 24);
    assert!(body["strength"]["score"].as_u64().unwrap() <= 4);

    let (status, body) = post(
        app.clone(),
        "/password/generate",
        json!({
            "include_uppercase": false,
            "include_lowercase": false,
            "include_numbers": false,
            "include_symbols": false,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_character_types");

    let (status, body) = post(app, "/password/analyze", json!({"password": "password"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["info"]["score"].as_u64().unwrap() <= 1);
}

#[tokio::test]
async fn test_listings() {
    let (_tmp, app) = app();
    let (_, drawers) = get(app.clone(), "/qr/module-drawers").await;
    assert_eq!(drawers["module_drawers"].as_array().unwrap().len(), 6);

    let (_, masks) = get(app.clone(), "/qr/color-masks").await;
    assert_eq!(masks["color_masks"].as_array().unwrap().len(), 6);

    let (_, levels) = get(app.clone(), "/qr/error-correction-levels").await;
    assert_eq!(levels["levels"].as_array().unwrap().len(), 4);

    let (status, algorithms) = get(app, "/hash/algorithms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(algorithms.as_array().unwrap().len(), 8);
}
