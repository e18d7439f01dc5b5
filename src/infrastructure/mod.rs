// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，提供对文件系统和监控的封装。
///
/// 包含的子模块：
/// - 压缩包（archive）：并发安全的压缩包写入器
/// - 交付（delivery）：把压缩包以流的方式交给客户端，结束后删除
/// - 指标（metrics）：提供系统监控指标
/// - 存储（storage）：临时压缩包目录的管理
pub mod archive;
pub mod delivery;
pub mod metrics;
pub mod storage;
