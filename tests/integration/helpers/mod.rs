// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use imgcrawl::config::settings::Settings;
use imgcrawl::domain::services::discovery_service::DiscoveryService;
use imgcrawl::domain::services::fetch_pack_service::FetchPackService;
use imgcrawl::engines::traits::{PageRenderer, RenderError};
use imgcrawl::infrastructure::storage::ArchiveStore;
use imgcrawl::presentation::routes;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

/// 返回固定候选地址的渲染器，不需要真实浏览器
pub struct FakeRenderer {
    result: Result<Vec<String>, RenderError>,
}

impl FakeRenderer {
    pub fn with_candidates(candidates: &[&str]) -> Self {
        Self {
            result: Ok(candidates.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn failing(error: RenderError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, _page_url: &Url) -> Result<Vec<String>, RenderError> {
        self.result.clone()
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// 测试用配置：允许访问本地 mock 服务器，压缩包写入临时目录
pub fn test_settings(archive_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.security.block_private_networks = false;
    settings.download.archive_dir = archive_dir.display().to_string();
    settings.download.timeout_secs = 5;
    settings
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub fetch: Arc<FetchPackService>,
    // Keep the archive directory alive
    pub archive_dir: TempDir,
}

pub fn create_test_app(renderer: FakeRenderer) -> TestApp {
    let archive_dir = tempfile::tempdir().unwrap();
    let settings = test_settings(archive_dir.path());

    let discovery = Arc::new(DiscoveryService::new(Arc::new(renderer), &settings).unwrap());
    let fetch = Arc::new(
        FetchPackService::new(ArchiveStore::new(archive_dir.path()), &settings).unwrap(),
    );
    let app = routes::routes(discovery, fetch.clone(), true);

    TestApp {
        server: TestServer::new(app).unwrap(),
        fetch,
        archive_dir,
    }
}

pub fn create_fetch_service(settings: &Settings) -> FetchPackService {
    FetchPackService::new(ArchiveStore::new(&settings.download.archive_dir), settings).unwrap()
}

pub fn archive_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

/// 等待目录清空，压缩包在响应体发送结束时删除
pub async fn wait_until_empty(dir: &Path) -> bool {
    for _ in 0..50 {
        if archive_files(dir).is_empty() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    archive_files(dir).is_empty()
}

/// 压缩包内的条目名（已排序）
pub fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}
