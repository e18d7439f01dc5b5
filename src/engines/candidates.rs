// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// 图片元素上按优先级检查的属性，`src` 之后是常见懒加载写法
pub const IMAGE_ATTRIBUTES: [&str; 8] = [
    "src",
    "data-src",
    "data-lazy-src",
    "data-original",
    "data-lazy",
    "data-url",
    "data-srcset",
    "srcset",
];

// Looser than the download-time classifier: svg/avif and extensions
// followed by a query or a srcset descriptor still count here.
static IMAGE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(jpe?g|png|webp|gif|bmp|svg|avif)(?:[?#\s]|$)")
        .expect("image reference pattern is valid")
});

static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("img selector is valid"));

/// 判断属性值是否像图片地址
pub fn looks_like_image(value: &str) -> bool {
    IMAGE_REFERENCE.is_match(value)
}

/// 从渲染后的 HTML 中提取候选图片地址
///
/// 每个 `<img>` 元素按 [`IMAGE_ATTRIBUTES`] 的顺序取第一个像图片地址的属性值，
/// 没有任何匹配属性的元素被丢弃。结果保持文档顺序，不做去重和规范化。
pub fn extract_candidates(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&IMG_SELECTOR)
        .filter_map(first_image_attribute)
        .collect()
}

fn first_image_attribute(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();
    IMAGE_ATTRIBUTES.iter().find_map(|attr| {
        let raw = value.attr(attr)?;
        let candidate = if attr.ends_with("srcset") {
            first_srcset_url(raw)?
        } else {
            raw.trim()
        };

        if candidate.is_empty() || candidate.starts_with("data:") {
            return None;
        }
        looks_like_image(candidate).then(|| candidate.to_string())
    })
}

/// 取 srcset 中第一个候选地址（去掉宽度/密度描述符）
fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .map(str::trim)
        .find(|entry| !entry.is_empty())
        .and_then(|entry| entry.split_whitespace().next())
}
