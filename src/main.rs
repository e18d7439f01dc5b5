// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use imgcrawl::config::settings::Settings;
use imgcrawl::domain::services::discovery_service::DiscoveryService;
use imgcrawl::domain::services::fetch_pack_service::FetchPackService;
use imgcrawl::engines::chromium_renderer::ChromiumRenderer;
use imgcrawl::engines::traits::PageRenderer;
use imgcrawl::infrastructure::metrics;
use imgcrawl::infrastructure::storage::ArchiveStore;
use imgcrawl::presentation::routes;
use imgcrawl::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging
    telemetry::init_telemetry(&settings.logging);
    info!("Starting imgcrawl...");
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics)?;

    // 3. Prepare archive directory
    let store = ArchiveStore::new(&settings.download.archive_dir);
    store.prepare().await?;
    info!("Archive directory ready at {}", store.base_path().display());

    // 4. Initialize services
    let renderer: Arc<dyn PageRenderer> = Arc::new(ChromiumRenderer::new(settings.renderer.clone()));
    info!("Page renderer: {}", renderer.name());
    let discovery = Arc::new(DiscoveryService::new(renderer, &settings)?);
    let fetch = Arc::new(FetchPackService::new(store, &settings)?);

    // 5. Start HTTP server
    let app = routes::routes(discovery, fetch, settings.server.cors_permissive);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
