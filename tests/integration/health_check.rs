// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode},
};
use imgcrawl::domain::services::discovery_service::DiscoveryService;
use imgcrawl::domain::services::fetch_pack_service::FetchPackService;
use imgcrawl::infrastructure::storage::ArchiveStore;
use imgcrawl::presentation::routes;
use std::sync::Arc;
use tower::util::ServiceExt;

use super::helpers::{create_test_app, test_settings, FakeRenderer};

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(dir.path());
    let discovery = Arc::new(
        DiscoveryService::new(Arc::new(FakeRenderer::with_candidates(&[])), &settings).unwrap(),
    );
    let fetch = Arc::new(FetchPackService::new(ArchiveStore::new(dir.path()), &settings).unwrap());
    let app = routes::routes(discovery, fetch, false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn version_reports_crate_version() {
    let app = create_test_app(FakeRenderer::with_candidates(&[]));

    let response = app.server.get("/version").await;

    response.assert_status_ok();
    response.assert_text(env!("CARGO_PKG_VERSION"));
}

/// 宽松 CORS 策略下预检请求被放行
#[tokio::test]
async fn cors_preflight_is_allowed() {
    let app = create_test_app(FakeRenderer::with_candidates(&[]));

    let response = app
        .server
        .method(Method::OPTIONS, "/download")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://localhost:8080"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-method"),
            HeaderValue::from_static("POST"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
