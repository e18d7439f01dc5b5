// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 定义HTTP接口使用的数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含图片发现与下载打包的核心业务逻辑
pub mod domain;

/// 引擎模块
///
/// 实现基于无头浏览器的页面渲染、自动滚动和候选地址提取
pub mod engines;

/// 基础设施模块
///
/// 提供压缩包读写、临时文件管理和指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和错误映射
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
