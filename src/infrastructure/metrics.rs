// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

use crate::config::settings::MetricsSettings;

pub const PAGES_RENDERED: &str = "imgcrawl_pages_rendered_total";
pub const IMAGES_DISCOVERED: &str = "imgcrawl_images_discovered_total";
pub const DOWNLOADS_SUCCEEDED: &str = "imgcrawl_downloads_succeeded_total";
pub const DOWNLOADS_FAILED: &str = "imgcrawl_downloads_failed_total";
pub const ARCHIVES_DELIVERED: &str = "imgcrawl_archives_delivered_total";

pub fn init_metrics(settings: &MetricsSettings) -> anyhow::Result<()> {
    if !settings.enabled {
        return Ok(());
    }

    let addr: SocketAddr = settings.listen_addr.parse()?;

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return Ok(());
    }

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
