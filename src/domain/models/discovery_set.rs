// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use url::Url;

/// 一次发现请求得到的图片地址集合
///
/// 按规范化后的字符串去重，保留首次出现的顺序
#[derive(Debug, Clone, Default)]
pub struct DiscoverySet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入地址，已存在时返回false
    pub fn insert(&mut self, url: Url) -> bool {
        let url = String::from(url);
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.ordered.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}
