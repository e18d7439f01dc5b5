// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：候选地址、发现结果集合与打包任务
/// - 服务（services）：图片发现服务与下载打包服务
///
/// 领域层只依赖渲染器抽象和基础设施层的存储组件。
pub mod models;
pub mod services;
