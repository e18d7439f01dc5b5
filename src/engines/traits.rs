// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// 渲染错误类型
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    /// 页面无法打开
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),
    /// 导航或脚本执行超时
    #[error("Timed out waiting for the page")]
    Timeout,
    /// 浏览器会话异常
    #[error("Browser error: {0}")]
    Browser(String),
}

/// 页面渲染器特质
///
/// 打开独立的浏览会话加载页面、触发懒加载，并返回页面中所有图片元素的候选地址。
/// 候选地址保持页面中的原始写法，可能是相对地址。
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 渲染页面并提取候选图片地址
    async fn render(&self, page_url: &Url) -> Result<Vec<String>, RenderError>;

    /// 渲染器名称
    fn name(&self) -> &'static str;
}

/// 可滚动页面特质
///
/// 自动滚动例程只依赖这两个能力，便于在没有浏览器的情况下测试
#[async_trait]
pub trait ScrollTarget: Send + Sync {
    /// 向下滚动指定距离
    async fn scroll_by(&self, distance: u32) -> Result<(), RenderError>;

    /// 当前文档的可滚动高度
    async fn scroll_height(&self) -> Result<u64, RenderError>;
}
