// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 图片发现请求数据传输对象
///
/// 对应 `GET /scrape?url=...` 的查询参数
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ScrapeQueryDto {
    /// 要扫描的网页URL
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
}

impl ScrapeQueryDto {
    /// 去掉首尾空白后的地址，缺失时返回空字符串
    pub fn target(&self) -> &str {
        self.url.as_deref().map(str::trim).unwrap_or_default()
    }
}
