// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::settings::Settings;
use crate::domain::models::candidate::CandidateUrl;
use crate::domain::models::discovery_set::DiscoverySet;
use crate::domain::services::ServiceError;
use crate::engines::traits::{PageRenderer, RenderError};
use crate::engines::validators::AddressGuard;
use crate::infrastructure::metrics::{IMAGES_DISCOVERED, PAGES_RENDERED};
use crate::utils::url_utils::{origin_base, parse_http_url};

/// 图片发现服务
///
/// 渲染页面后对候选地址做规范化、分类和去重
pub struct DiscoveryService {
    renderer: Arc<dyn PageRenderer>,
    /// 限制同时存在的浏览器会话数
    sessions: Arc<Semaphore>,
    guard: AddressGuard,
}

impl DiscoveryService {
    pub fn new(renderer: Arc<dyn PageRenderer>, settings: &Settings) -> Result<Self, ServiceError> {
        let renderer_settings = &settings.renderer;
        if renderer_settings.scroll_step == 0 || renderer_settings.scroll_interval_ms == 0 {
            return Err(ServiceError::InvalidInput(
                "renderer.scroll_step and renderer.scroll_interval_ms must be greater than zero"
                    .to_string(),
            ));
        }
        if renderer_settings.max_sessions == 0 {
            return Err(ServiceError::InvalidInput(
                "renderer.max_sessions must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            renderer,
            sessions: Arc::new(Semaphore::new(renderer_settings.max_sessions)),
            guard: AddressGuard::new(&settings.security),
        })
    }

    /// 发现页面中的图片
    ///
    /// # 参数
    ///
    /// * `page_url` - 目标页面的绝对地址
    ///
    /// # 返回值
    ///
    /// * `Ok(DiscoverySet)` - 去重后的绝对图片地址
    /// * `Err(ServiceError)` - 地址无效或页面渲染失败
    pub async fn discover(&self, page_url: &str) -> Result<DiscoverySet, ServiceError> {
        if page_url.trim().is_empty() {
            return Err(ServiceError::InvalidInput("URL required".to_string()));
        }
        let page_url = parse_http_url(page_url)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid page URL: {}", e)))?;

        // A host that does not resolve is unreachable, not a bad request
        self.guard.check(&page_url).await.map_err(|e| {
            if e.is_blocked() {
                ServiceError::InvalidInput(format!("URL not allowed: {}", e))
            } else {
                ServiceError::ScrapeFailed(RenderError::NavigationFailed(e.to_string()))
            }
        })?;

        let base = origin_base(&page_url)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid page URL: {}", e)))?;

        let raw_candidates = {
            let _permit = self
                .sessions
                .acquire()
                .await
                .map_err(|_| ServiceError::Internal("renderer pool is closed".to_string()))?;
            self.renderer.render(&page_url).await?
        };
        metrics::counter!(PAGES_RENDERED).increment(1);

        let mut images = DiscoverySet::new();
        let mut dropped = 0usize;
        for raw in &raw_candidates {
            match CandidateUrl::evaluate(raw, &base) {
                Ok(candidate) => match candidate.into_image_url() {
                    Some(url) => {
                        images.insert(url);
                    }
                    None => dropped += 1,
                },
                Err(e) => {
                    debug!("Skipping candidate {:?}: {}", raw, e);
                    dropped += 1;
                }
            }
        }

        info!(
            "Discovered {} images on {} via {} ({} candidates, {} dropped)",
            images.len(),
            page_url,
            self.renderer.name(),
            raw_candidates.len(),
            dropped
        );
        metrics::counter!(IMAGES_DISCOVERED).increment(images.len() as u64);

        Ok(images)
    }
}
