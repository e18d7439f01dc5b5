// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// URL 规范化错误类型
///
/// 发现阶段遇到此类错误时只丢弃对应候选，不会中断整个请求
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid URL '{0}'")]
    Invalid(String),

    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
}
