// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 下载打包请求数据传输对象
///
/// 对应 `POST /download` 的 JSON 请求体，缺少 `images` 字段时视为空列表
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DownloadRequestDto {
    /// 选中的图片地址，重复地址各自产生一个下载结果
    #[serde(default)]
    pub images: Vec<String>,
}
