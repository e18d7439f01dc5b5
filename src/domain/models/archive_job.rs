// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;
use uuid::Uuid;

use crate::infrastructure::storage::TempArchive;

/// 单个地址的下载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 已写入压缩包
    Success {
        url: String,
        /// 推断出的扩展名
        extension: &'static str,
        /// 压缩包内的条目名
        entry: String,
        /// 图片字节数
        bytes: u64,
    },
    /// 下载失败，不会向压缩包贡献任何内容
    Failure { url: String, reason: String },
}

impl FetchOutcome {
    pub fn failure(url: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchOutcome::Failure {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Success { url, .. } | FetchOutcome::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// 一次下载请求的汇总
///
/// 持有已完成的临时压缩包，释放时压缩包文件随之删除
#[derive(Debug)]
pub struct ArchiveJob {
    pub id: Uuid,
    /// 每个请求地址恰好一个结果，按请求顺序排列
    pub outcomes: Vec<FetchOutcome>,
    archive: TempArchive,
}

impl ArchiveJob {
    pub fn new(id: Uuid, outcomes: Vec<FetchOutcome>, archive: TempArchive) -> Self {
        Self {
            id,
            outcomes,
            archive,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// 失败原因，按请求顺序排列
    pub fn failures(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                FetchOutcome::Failure { reason, .. } => Some(reason.as_str()),
                FetchOutcome::Success { .. } => None,
            })
            .collect()
    }

    /// 压缩包内的条目名
    pub fn entries(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                FetchOutcome::Success { entry, .. } => Some(entry.as_str()),
                FetchOutcome::Failure { .. } => None,
            })
            .collect()
    }

    pub fn archive_path(&self) -> &Path {
        self.archive.path()
    }

    pub fn into_archive(self) -> TempArchive {
        self.archive
    }
}
