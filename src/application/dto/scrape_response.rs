// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::discovery_set::DiscoverySet;

/// 图片发现响应数据传输对象
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesResponseDto {
    /// 去重后的图片地址，保持首次发现的顺序
    pub images: Vec<String>,
}

impl From<DiscoverySet> for ImagesResponseDto {
    fn from(set: DiscoverySet) -> Self {
        Self {
            images: set.into_vec(),
        }
    }
}
