// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::RendererSettings;
use crate::engines::auto_scroll::{auto_scroll, ScrollPolicy};
use crate::engines::candidates::extract_candidates;
use crate::engines::traits::{PageRenderer, RenderError, ScrollTarget};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Chromium 渲染器
///
/// 基于chromiumoxide实现。每次渲染都使用全新的浏览会话：本地模式启动独立的
/// Chrome 进程（独立的用户数据目录），远程模式在远程实例上创建隐身上下文，
/// 因此请求之间不共享 cookie 和缓存。
pub struct ChromiumRenderer {
    settings: RendererSettings,
}

impl ChromiumRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    async fn open_session(&self) -> Result<BrowserSession, RenderError> {
        if let Some(ref url) = self.settings.remote_url {
            debug!("Connecting to remote Chrome instance at: {}", url);
            // Pending navigations are dropped by the handler after `request_timeout`
            let config = HandlerConfig {
                request_timeout: self.settings.navigation_timeout(),
                ..HandlerConfig::default()
            };
            let (browser, handler) = Browser::connect_with_config(url.as_str(), config)
                .await
                .map_err(|e| {
                    RenderError::Browser(format!("Failed to connect to remote Chrome: {}", e))
                })?;
            let handler = spawn_handler(handler);

            let context = match browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
            {
                Ok(context) => context,
                Err(e) => {
                    handler.abort();
                    return Err(RenderError::Browser(format!(
                        "Failed to create browser context: {}",
                        e
                    )));
                }
            };

            return Ok(BrowserSession {
                browser,
                handler,
                context: Some(context),
                profile_dir: None,
                launched: false,
            });
        }

        let profile_dir = std::env::temp_dir().join(format!("imgcrawl-profile-{}", Uuid::new_v4()));
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.settings.navigation_timeout())
            .user_data_dir(&profile_dir)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if let Some(ref executable) = self.settings.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(RenderError::Browser)?;

        let (browser, handler) = Browser::launch(config).await.map_err(|e| {
            let _ = std::fs::remove_dir_all(&profile_dir);
            RenderError::Browser(format!("Failed to launch Chrome: {}", e))
        })?;

        Ok(BrowserSession {
            browser,
            handler: spawn_handler(handler),
            context: None,
            profile_dir: Some(profile_dir),
            launched: true,
        })
    }

    async fn render_in_session(
        &self,
        session: &BrowserSession,
        page_url: &Url,
    ) -> Result<Vec<String>, RenderError> {
        let page = session.new_page().await?;

        tokio::time::timeout(self.settings.navigation_timeout(), async {
            page.goto(page_url.as_str())
                .await
                .map_err(navigation_error)?;
            page.wait_for_navigation()
                .await
                .map_err(navigation_error)?;
            Ok::<_, RenderError>(())
        })
        .await
        .map_err(|_| RenderError::Timeout)??;

        let report = auto_scroll(&PageScroller { page: &page }, &ScrollPolicy::from(&self.settings)).await?;
        debug!(
            "Scrolled {} ({} steps, {}px, capped: {})",
            page_url, report.steps, report.distance, report.capped
        );

        if self.settings.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.settings.settle_ms)).await;
        }

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::Browser(e.to_string()))?;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        Ok(extract_candidates(&html))
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    /// 渲染页面并提取候选图片地址
    ///
    /// 无论成功与否，浏览会话都会在返回前关闭
    async fn render(&self, page_url: &Url) -> Result<Vec<String>, RenderError> {
        let start = Instant::now();
        let session = self.open_session().await?;

        let result = self.render_in_session(&session, page_url).await;
        session.close().await;

        match &result {
            Ok(candidates) => info!(
                "Rendered {} in {}ms, {} candidates",
                page_url,
                start.elapsed().as_millis(),
                candidates.len()
            ),
            Err(e) => warn!("Rendering {} failed: {}", page_url, e),
        }
        result
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

fn navigation_error(e: CdpError) -> RenderError {
    match e {
        CdpError::Timeout => RenderError::Timeout,
        other => RenderError::NavigationFailed(other.to_string()),
    }
}

fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    })
}

/// 一次渲染独占的浏览会话
///
/// `close` 负责正常关闭；请求被取消时 `Drop` 仍会停止事件循环并清理用户数据目录，
/// 本地启动的 Chrome 进程随 `Browser` 一起被回收。
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    context: Option<BrowserContextId>,
    profile_dir: Option<PathBuf>,
    launched: bool,
}

impl BrowserSession {
    async fn new_page(&self) -> Result<Page, RenderError> {
        let page = match &self.context {
            Some(context) => {
                let params = CreateTargetParams::builder()
                    .url("about:blank")
                    .browser_context_id(context.clone())
                    .build()
                    .map_err(RenderError::Browser)?;
                self.browser.new_page(params).await
            }
            None => self.browser.new_page("about:blank").await,
        };
        page.map_err(|e| RenderError::Browser(e.to_string()))
    }

    async fn close(mut self) {
        if let Some(context) = self.context.take() {
            if let Err(e) = self.browser.dispose_browser_context(context).await {
                warn!("Failed to dispose browser context: {}", e);
            }
        }

        if self.launched {
            if let Err(e) = self.browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
        if let Some(dir) = self.profile_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("Failed to remove profile dir {}: {}", dir.display(), e);
                }
            }
        }
    }
}

/// 通过页面脚本实现滚动能力
struct PageScroller<'a> {
    page: &'a Page,
}

#[async_trait]
impl ScrollTarget for PageScroller<'_> {
    async fn scroll_by(&self, distance: u32) -> Result<(), RenderError> {
        self.page
            .evaluate(format!("window.scrollBy(0, {})", distance))
            .await
            .map_err(|e| RenderError::Browser(format!("Scroll failed: {}", e)))?;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64, RenderError> {
        let height: f64 = self
            .page
            .evaluate("document.documentElement.scrollHeight || document.body.scrollHeight")
            .await
            .map_err(|e| RenderError::Browser(format!("Reading scroll height failed: {}", e)))?
            .into_value()
            .map_err(|e| RenderError::Browser(format!("Unexpected scroll height: {}", e)))?;
        Ok(height.max(0.0) as u64)
    }
}
