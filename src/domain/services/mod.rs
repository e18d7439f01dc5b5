// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::engines::traits::RenderError;
use crate::infrastructure::archive::ArchiveError;

pub mod discovery_service;
pub mod fetch_pack_service;

/// 领域服务错误类型
///
/// 单个候选或单个下载的失败在服务内部吸收，只有整体失败才会以此类型上报
#[derive(Error, Debug)]
pub enum ServiceError {
    /// 调用方输入有误（缺少地址、地址格式错误等）
    #[error("{0}")]
    InvalidInput(String),

    /// 页面渲染失败，不返回部分结果
    #[error("Failed to scrape page: {0}")]
    ScrapeFailed(#[from] RenderError),

    /// 下载请求中没有任何图片
    #[error("No images selected")]
    NoImagesSelected,

    /// 所有图片都下载失败，`failures` 按请求顺序保存每个地址的失败原因
    #[error("All downloads failed")]
    AllDownloadsFailed { failures: Vec<String> },

    /// 压缩包读写失败
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// 判断错误是否由调用方引起
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidInput(_)
                | ServiceError::NoImagesSelected
                | ServiceError::AllDownloadsFailed { .. }
        )
    }
}
