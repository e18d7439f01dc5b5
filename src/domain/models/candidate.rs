// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

use crate::utils::errors::UrlError;
use crate::utils::image_types::is_image;
use crate::utils::url_utils::normalize;

/// 候选地址的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Image,
    NonImage,
}

/// 从页面属性中扫描出的候选地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    /// 页面中的原始写法
    pub raw: String,
    /// 规范化后的绝对地址
    pub absolute: Url,
    /// 分类结果
    pub kind: CandidateKind,
}

impl CandidateUrl {
    /// 规范化并分类一个原始候选
    ///
    /// 无法解析为 http/https 绝对地址时返回错误，调用方应直接丢弃
    pub fn evaluate(raw: &str, base_origin: &Url) -> Result<Self, UrlError> {
        let absolute = normalize(raw, base_origin)?;
        let kind = if is_image(absolute.as_str()) {
            CandidateKind::Image
        } else {
            CandidateKind::NonImage
        };

        Ok(Self {
            raw: raw.to_string(),
            absolute,
            kind,
        })
    }

    pub fn is_image(&self) -> bool {
        self.kind == CandidateKind::Image
    }

    /// 只有分类为图片的候选才能进入发现结果
    pub fn into_image_url(self) -> Option<Url> {
        self.is_image().then_some(self.absolute)
    }
}
