// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::infrastructure::archive::ArchiveError;

/// 临时压缩包目录
///
/// 每个下载请求在这里分配一个独立的压缩包文件，响应结束后即删除
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    base_path: PathBuf,
}

impl ArchiveStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// 确保目录存在，并清理上次进程异常退出时遗留的压缩包
    ///
    /// # 返回值
    ///
    /// 被清理的文件数量
    pub async fn prepare(&self) -> Result<usize, ArchiveError> {
        fs::create_dir_all(&self.base_path).await?;

        let mut removed = 0;
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_zip = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
            if !is_zip || !entry.file_type().await?.is_file() {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove stale archive {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            info!(
                "Removed {} stale archives from {}",
                removed,
                self.base_path.display()
            );
        }
        Ok(removed)
    }

    /// 分配一个新的临时压缩包路径（文件尚未创建）
    pub fn allocate(&self) -> TempArchive {
        let name = format!(
            "{}-{}.zip",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        TempArchive {
            path: self.base_path.join(name),
        }
    }
}

/// 磁盘上的临时压缩包
///
/// 被释放时删除对应文件，成功、失败和请求取消的路径都由它保证清理
#[derive(Debug)]
pub struct TempArchive {
    path: PathBuf,
}

impl TempArchive {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed archive {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove archive {}: {}", self.path.display(), e),
        }
    }
}
