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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 桌面版 Chrome 的 User-Agent，图片下载时用于伪装浏览器身份
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、页面渲染、图片下载、安全和指标等所有配置项
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 页面渲染配置
    pub renderer: RendererSettings,
    /// 图片下载与打包配置
    pub download: DownloadSettings,
    /// 安全配置
    pub security: SecuritySettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 日志输出配置
    pub logging: LoggingSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 是否启用宽松的 CORS 策略
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_permissive: true,
        }
    }
}

/// 页面渲染配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// 远程 Chrome 调试地址，设置后连接远程实例而不是本地启动
    pub remote_url: Option<String>,
    /// Chrome 可执行文件路径
    pub chrome_executable: Option<String>,
    /// 页面导航超时时间（秒）
    pub navigation_timeout_secs: u64,
    /// 每次滚动的距离（像素）
    pub scroll_step: u32,
    /// 滚动间隔（毫秒）
    pub scroll_interval_ms: u64,
    /// 累计滚动距离上限（像素）
    pub max_scroll_distance: u64,
    /// 滚动结束后等待懒加载请求完成的时间（毫秒）
    pub settle_ms: u64,
    /// 同时存在的浏览器会话上限
    pub max_sessions: usize,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            remote_url: None,
            chrome_executable: None,
            navigation_timeout_secs: 60,
            scroll_step: 500,
            scroll_interval_ms: 800,
            max_scroll_distance: 15_000,
            settle_ms: 1_000,
            max_sessions: 4,
        }
    }
}

impl RendererSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }
}

/// 图片下载与打包配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// 临时压缩包目录
    pub archive_dir: String,
    /// 单张图片下载超时时间（秒）
    pub timeout_secs: u64,
    /// 单次打包任务中同时进行的下载数上限
    pub max_concurrent: usize,
    /// 单张图片的最大字节数
    pub max_image_bytes: u64,
    /// 下载时使用的 User-Agent
    pub user_agent: String,
    /// zip 压缩级别 (0-9)
    pub compression_level: i32,
    /// 错误响应中展示的失败原因条数
    pub max_error_details: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            archive_dir: "./downloads".to_string(),
            timeout_secs: 15,
            max_concurrent: 8,
            max_image_bytes: 20 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            compression_level: 9,
            max_error_details: 3,
        }
    }
}

impl DownloadSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 安全配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// 是否拒绝访问私有网络地址 (SSRF 防护)
    pub block_private_networks: bool,
    /// 不做地址检查的可信主机名（精确匹配，不区分大小写）
    pub allowed_hosts: Vec<String>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            block_private_networks: true,
            allowed_hosts: Vec::new(),
        }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 便于阅读的文本格式
    #[default]
    Text,
    /// 每行一个 JSON 对象，便于日志采集
    Json,
}

/// 日志配置设置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "0.0.0.0:9000".to_string(),
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件和环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("renderer.navigation_timeout_secs", 60)?
            .set_default("renderer.scroll_step", 500)?
            .set_default("renderer.scroll_interval_ms", 800)?
            .set_default("renderer.max_scroll_distance", 15_000)?
            .set_default("download.archive_dir", "./downloads")?
            .set_default("download.timeout_secs", 15)?
            .set_default("download.max_concurrent", 8)?
            .set_default("download.user_agent", DEFAULT_USER_AGENT)?
            .set_default("security.block_private_networks", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("IMGCRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
