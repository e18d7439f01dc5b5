// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::infrastructure::storage::TempArchive;

/// 压缩包错误类型
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive is already finalized")]
    Finalized,
}

/// 已完成的压缩包
#[derive(Debug)]
pub struct FinishedArchive {
    pub archive: TempArchive,
    pub entries: Vec<String>,
}

struct OpenArchive {
    zip: ZipWriter<BufWriter<File>>,
    entries: Vec<String>,
    // declared last so the writer is closed before the file is removed
    file: TempArchive,
}

/// 压缩包写入器
///
/// 一个下载任务内所有并发的抓取共享同一个写入器，追加操作在互斥锁内完成。
/// 条目名 `image_<n>.<ext>` 在锁内分配，`n` 只统计成功写入的条目，
/// 因此编号没有空洞、没有冲突，顺序与完成顺序一致。
/// 写入均为阻塞 I/O，异步代码应通过 `spawn_blocking` 调用。
pub struct ArchiveWriter {
    state: Mutex<Option<OpenArchive>>,
    options: FileOptions,
}

impl ArchiveWriter {
    /// 在 `archive` 指向的路径上创建压缩包
    pub fn create(archive: TempArchive, compression_level: i32) -> Result<Self, ArchiveError> {
        let file = File::create(archive.path())?;
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level.clamp(0, 9)))
            .unix_permissions(0o644);

        Ok(Self {
            state: Mutex::new(Some(OpenArchive {
                zip: ZipWriter::new(BufWriter::new(file)),
                entries: Vec::new(),
                file: archive,
            })),
            options,
        })
    }

    /// 追加一张图片，返回分配的条目名
    pub fn append(&self, extension: &str, data: &[u8]) -> Result<String, ArchiveError> {
        let mut guard = self.state.lock();
        let open = guard.as_mut().ok_or(ArchiveError::Finalized)?;

        let name = format!("image_{}.{}", open.entries.len() + 1, extension);
        open.zip.start_file(name.as_str(), self.options)?;
        open.zip.write_all(data)?;
        open.entries.push(name.clone());
        Ok(name)
    }

    /// 已成功写入的条目数
    pub fn entry_count(&self) -> usize {
        self.state
            .lock()
            .as_ref()
            .map_or(0, |open| open.entries.len())
    }

    /// 写入中央目录并关闭文件，之后不能再追加
    pub fn finish(&self) -> Result<FinishedArchive, ArchiveError> {
        let open = self.state.lock().take().ok_or(ArchiveError::Finalized)?;
        let OpenArchive {
            mut zip,
            entries,
            file,
        } = open;

        let mut inner = zip.finish()?;
        inner.flush()?;
        drop(inner);
        drop(zip);

        Ok(FinishedArchive {
            archive: file,
            entries,
        })
    }
}
