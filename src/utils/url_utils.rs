// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::UrlError;
use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
///
/// 已经是绝对地址的候选原样返回，否则基于 `base_origin` 按标准规则解析。
/// 只接受 http/https，其它协议（data:、javascript: 等）视为无效候选。
pub fn normalize(candidate: &str, base_origin: &Url) -> Result<Url, UrlError> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Err(UrlError::Invalid(String::new()));
    }

    let url = match Url::parse(candidate) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => base_origin
            .join(candidate)
            .map_err(|_| UrlError::Invalid(candidate.to_string()))?,
        Err(_) => return Err(UrlError::Invalid(candidate.to_string())),
    };

    ensure_http(url)
}

/// 取页面地址的源 (scheme://host:port) 作为相对地址解析的基准
pub fn origin_base(page_url: &Url) -> Result<Url, UrlError> {
    let origin = page_url.origin();
    if !origin.is_tuple() {
        return Err(UrlError::Invalid(page_url.to_string()));
    }
    Url::parse(&origin.ascii_serialization())
        .map_err(|_| UrlError::Invalid(page_url.to_string()))
}

/// 解析调用方传入的页面或图片地址，必须是 http/https 绝对地址
pub fn parse_http_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|_| UrlError::Invalid(raw.to_string()))?;
    ensure_http(url)
}

fn ensure_http(url: Url) -> Result<Url, UrlError> {
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::UnsupportedScheme(other.to_string())),
    }
}
