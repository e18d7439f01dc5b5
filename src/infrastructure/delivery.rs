// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

use crate::infrastructure::archive::ArchiveError;
use crate::infrastructure::metrics::ARCHIVES_DELIVERED;
use crate::infrastructure::storage::TempArchive;

/// 待发送的压缩包
pub struct ArchiveDelivery {
    content_length: u64,
    stream: ArchiveBodyStream,
}

impl ArchiveDelivery {
    /// 打开已完成的压缩包准备发送
    ///
    /// 打开失败时 `archive` 随错误一起被释放，文件同样会被删除
    pub async fn open(archive: TempArchive) -> Result<Self, ArchiveError> {
        let file = tokio::fs::File::open(archive.path()).await?;
        let content_length = file.metadata().await?.len();

        Ok(Self {
            content_length,
            stream: ArchiveBodyStream {
                inner: ReaderStream::new(file),
                archive: Some(archive),
                sent: 0,
            },
        })
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn into_stream(self) -> ArchiveBodyStream {
        self.stream
    }
}

/// 压缩包响应体
///
/// 读到文件末尾、读取出错或被提前丢弃（客户端断开）时都会删除压缩包。
/// 发送阶段的错误只记录日志，此时响应头已经发出，无法再改为错误响应。
pub struct ArchiveBodyStream {
    inner: ReaderStream<tokio::fs::File>,
    archive: Option<TempArchive>,
    sent: u64,
}

impl ArchiveBodyStream {
    fn release(&mut self) {
        if let Some(archive) = self.archive.take() {
            debug!("Archive {} released after {} bytes", archive.path().display(), self.sent);
            drop(archive);
        }
    }
}

impl Stream for ArchiveBodyStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                error!("Failed to read archive during delivery: {}", e);
                this.release();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if this.archive.is_some() {
                    metrics::counter!(ARCHIVES_DELIVERED).increment(1);
                }
                this.release();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ArchiveBodyStream {
    fn drop(&mut self) {
        if self.archive.is_some() {
            warn!(
                "Archive delivery interrupted after {} bytes, removing archive",
                self.sent
            );
            self.release();
        }
    }
}
