// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use imgcrawl::engines::traits::RenderError;
use serde_json::{json, Value};

use super::helpers::{create_test_app, FakeRenderer};

/// 相对地址、重复地址和非图片地址混合时，只返回去重后的图片
#[tokio::test]
async fn scrape_returns_deduplicated_images() {
    let app = create_test_app(FakeRenderer::with_candidates(&[
        "/a.jpg",
        "https://x.com/a.jpg",
        "b.png",
        "c.txt",
    ]));

    let response = app
        .server
        .get("/scrape")
        .add_query_param("url", "https://x.com/gallery")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "images": ["https://x.com/a.jpg", "https://x.com/b.png"]
    }));
}

#[tokio::test]
async fn scrape_with_no_images_returns_empty_list() {
    let app = create_test_app(FakeRenderer::with_candidates(&["/style.css", "data:image/png;base64,AAAA"]));

    let response = app
        .server
        .get("/scrape")
        .add_query_param("url", "https://x.com/")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "images": [] }));
}

#[tokio::test]
async fn scrape_without_url_is_bad_request() {
    let app = create_test_app(FakeRenderer::with_candidates(&["/a.jpg"]));

    let response = app.server.get("/scrape").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "URL required" }));
}

#[tokio::test]
async fn scrape_with_malformed_url_is_bad_request() {
    let app = create_test_app(FakeRenderer::with_candidates(&["/a.jpg"]));

    let response = app
        .server
        .get("/scrape")
        .add_query_param("url", "not a url")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid"));
}

#[tokio::test]
async fn scrape_reports_render_failure_as_server_error() {
    let app = create_test_app(FakeRenderer::failing(RenderError::Timeout));

    let response = app
        .server
        .get("/scrape")
        .add_query_param("url", "https://x.com/gallery")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["images"].is_null());
    assert!(body["error"].as_str().unwrap().contains("Timed out"));
}
