// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::services::{
    discovery_service::DiscoveryService, fetch_pack_service::FetchPackService,
};
use crate::presentation::handlers::{discover_handler, download_handler};

/// 创建应用路由
///
/// # 参数
///
/// * `discovery` - 图片发现服务
/// * `fetch` - 下载打包服务
/// * `cors_permissive` - 是否允许任意来源的跨域请求
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(
    discovery: Arc<DiscoveryService>,
    fetch: Arc<FetchPackService>,
    cors_permissive: bool,
) -> Router {
    let cors = if cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/scrape", get(discover_handler::discover_images))
        .route("/download", post(download_handler::download_images))
        .layer(Extension(discovery))
        .layer(Extension(fetch))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
