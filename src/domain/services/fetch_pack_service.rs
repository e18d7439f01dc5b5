// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::StreamExt;
use reqwest::header::{ACCEPT, LOCATION, REFERER};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::settings::{DownloadSettings, Settings};
use crate::domain::models::archive_job::{ArchiveJob, FetchOutcome};
use crate::domain::services::ServiceError;
use crate::engines::validators::AddressGuard;
use crate::infrastructure::archive::{ArchiveError, ArchiveWriter};
use crate::infrastructure::metrics::{DOWNLOADS_FAILED, DOWNLOADS_SUCCEEDED};
use crate::infrastructure::storage::ArchiveStore;
use crate::utils::image_types::{archive_extension, is_image};
use crate::utils::url_utils::parse_http_url;

const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";
const MAX_REDIRECTS: usize = 10;

/// 单个下载的限制条件
#[derive(Debug, Clone)]
struct FetchLimits {
    max_bytes: u64,
    guard: AddressGuard,
}

/// 图片下载打包服务
///
/// 并发下载选中的图片并写入同一个压缩包。单张图片失败只记录原因，
/// 所有下载结束后才决定整体成败。
pub struct FetchPackService {
    store: ArchiveStore,
    settings: DownloadSettings,
    guard: AddressGuard,
}

impl FetchPackService {
    pub fn new(store: ArchiveStore, settings: &Settings) -> Result<Self, ServiceError> {
        let download = &settings.download;
        if download.max_concurrent == 0 {
            return Err(ServiceError::InvalidInput(
                "download.max_concurrent must be greater than zero".to_string(),
            ));
        }
        if download.timeout_secs == 0 {
            return Err(ServiceError::InvalidInput(
                "download.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            store,
            settings: download.clone(),
            guard: AddressGuard::new(&settings.security),
        })
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// 错误响应中展示的失败原因条数
    pub fn max_error_details(&self) -> usize {
        self.settings.max_error_details
    }

    /// 下载并打包
    ///
    /// # 参数
    ///
    /// * `urls` - 选中的图片地址，每个地址恰好产生一个下载结果
    ///
    /// # 返回值
    ///
    /// * `Ok(ArchiveJob)` - 至少一张图片成功，压缩包已完成
    /// * `Err(ServiceError::NoImagesSelected)` - 没有选择任何图片
    /// * `Err(ServiceError::AllDownloadsFailed)` - 全部失败，压缩包已删除
    pub async fn fetch_and_pack(&self, urls: &[String]) -> Result<ArchiveJob, ServiceError> {
        if urls.is_empty() {
            return Err(ServiceError::NoImagesSelected);
        }

        let start = Instant::now();
        let job_id = Uuid::new_v4();
        let client = Client::builder()
            .user_agent(self.settings.user_agent.as_str())
            .timeout(self.settings.timeout())
            // every hop goes through the address guard in `send_guarded`
            .redirect(Policy::none())
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let writer = Arc::new(ArchiveWriter::create(
            self.store.allocate(),
            self.settings.compression_level,
        )?);
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrent));
        let limits = Arc::new(FetchLimits {
            max_bytes: self.settings.max_image_bytes,
            guard: self.guard.clone(),
        });

        info!(
            "Job {}: fetching {} images (max {} concurrent)",
            job_id,
            urls.len(),
            self.settings.max_concurrent
        );

        // Dropping the JoinSet aborts every fetch still in flight
        let mut tasks = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            let client = client.clone();
            let writer = writer.clone();
            let permits = permits.clone();
            let limits = limits.clone();
            let url = url.clone();
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return Ok((index, FetchOutcome::failure(url, "download cancelled")));
                };
                let outcome = fetch_into_archive(&client, &writer, &url, &limits).await?;
                Ok::<_, ArchiveError>((index, outcome))
            });
        }

        let mut slots: Vec<Option<FetchOutcome>> = vec![None; urls.len()];
        let mut archive_fault = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((index, outcome))) => slots[index] = Some(outcome),
                Ok(Err(e)) => {
                    error!("Job {}: archive write failed: {}", job_id, e);
                    archive_fault.get_or_insert(e);
                }
                Err(e) => error!("Job {}: download task aborted: {}", job_id, e),
            }
        }

        if let Some(e) = archive_fault {
            return Err(ServiceError::Archive(e));
        }

        let outcomes: Vec<FetchOutcome> = slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    FetchOutcome::failure(
                        url.as_str(),
                        format!("Failed to download {}: download task did not complete", url),
                    )
                })
            })
            .collect();

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        if succeeded == 0 {
            // the partial archive is removed together with the writer
            drop(writer);
            let failures: Vec<String> = outcomes
                .into_iter()
                .filter_map(|outcome| match outcome {
                    FetchOutcome::Failure { reason, .. } => Some(reason),
                    FetchOutcome::Success { .. } => None,
                })
                .collect();
            error!(
                "Job {}: all {} downloads failed",
                job_id,
                failures.len()
            );
            return Err(ServiceError::AllDownloadsFailed { failures });
        }

        let finished = tokio::task::spawn_blocking(move || writer.finish())
            .await
            .map_err(|e| ServiceError::Internal(format!("Archive finalization aborted: {}", e)))??;
        debug_assert_eq!(finished.entries.len(), succeeded);

        info!(
            "Job {}: packed {}/{} images in {}ms",
            job_id,
            succeeded,
            urls.len(),
            start.elapsed().as_millis()
        );

        Ok(ArchiveJob::new(job_id, outcomes, finished.archive))
    }
}

/// 下载一张图片并追加到压缩包
///
/// 下载失败返回 `Ok(FetchOutcome::Failure)`，只有压缩包写入失败才返回错误
async fn fetch_into_archive(
    client: &Client,
    writer: &Arc<ArchiveWriter>,
    url: &str,
    limits: &FetchLimits,
) -> Result<FetchOutcome, ArchiveError> {
    let body = match fetch_image(client, url, limits).await {
        Ok(body) => body,
        Err(reason) => {
            warn!("{}", reason);
            metrics::counter!(DOWNLOADS_FAILED).increment(1);
            return Ok(FetchOutcome::failure(url, reason));
        }
    };

    let extension = archive_extension(url);
    let bytes = body.len() as u64;
    let sink = writer.clone();
    let entry = tokio::task::spawn_blocking(move || sink.append(extension, &body))
        .await
        .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))??;

    debug!("Packed {} as {} ({} bytes)", url, entry, bytes);
    metrics::counter!(DOWNLOADS_SUCCEEDED).increment(1);

    Ok(FetchOutcome::Success {
        url: url.to_string(),
        extension,
        entry,
        bytes,
    })
}

/// 下载图片内容，失败时返回可读的原因（包含地址）
async fn fetch_image(client: &Client, url: &str, limits: &FetchLimits) -> Result<Vec<u8>, String> {
    if !is_image(url) {
        return Err(format!("Invalid image URL: {}", url));
    }
    let parsed = parse_http_url(url).map_err(|_| format!("Invalid image URL: {}", url))?;

    let response = send_guarded(client, url, parsed, &limits.guard).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Failed to download {}: HTTP {}", url, status));
    }

    let expected = response.content_length().unwrap_or(0);
    if expected > limits.max_bytes {
        return Err(too_large(url, limits.max_bytes));
    }

    let mut body = Vec::with_capacity(expected as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| describe_request_error(url, &e))?;
        if (body.len() + chunk.len()) as u64 > limits.max_bytes {
            return Err(too_large(url, limits.max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// 发送请求并手动跟随重定向，每一跳在连接前都经过地址检查
async fn send_guarded(
    client: &Client,
    url: &str,
    target: Url,
    guard: &AddressGuard,
) -> Result<Response, String> {
    // Many image hosts reject hot-linked requests without a plausible referrer
    let referer = target.origin().ascii_serialization();
    let mut current = target;

    for _ in 0..=MAX_REDIRECTS {
        guard
            .check(&current)
            .await
            .map_err(|e| {
                if e.is_blocked() {
                    format!("Blocked {}: {}", url, e)
                } else {
                    format!("Failed to download {}: {}", url, e)
                }
            })?;

        let response = client
            .get(current.clone())
            .header(REFERER, referer.as_str())
            .header(ACCEPT, IMAGE_ACCEPT)
            .send()
            .await
            .map_err(|e| describe_request_error(url, &e))?;

        if !response.status().is_redirection() {
            return Ok(response);
        }
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let Some(location) = location else {
            return Ok(response);
        };

        let next = current
            .join(&location)
            .ok()
            .filter(|next| matches!(next.scheme(), "http" | "https"))
            .ok_or_else(|| format!("Failed to download {}: invalid redirect", url))?;
        debug!("Following redirect {} -> {}", current, next);
        current = next;
    }

    Err(format!("Failed to download {}: too many redirects", url))
}

fn too_large(url: &str, max_bytes: u64) -> String {
    format!(
        "Failed to download {}: exceeds size limit of {} bytes",
        url, max_bytes
    )
}

fn describe_request_error(url: &str, e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Failed to download {}: timed out", url)
    } else if e.is_connect() {
        format!("Failed to download {}: connection failed ({})", url, e)
    } else {
        format!("Failed to download {}: {}", url, e)
    }
}
