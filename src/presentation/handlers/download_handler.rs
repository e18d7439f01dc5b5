// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Body,
    extract::{Extension, Json},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::application::dto::download_request::DownloadRequestDto;
use crate::domain::services::{fetch_pack_service::FetchPackService, ServiceError};
use crate::infrastructure::delivery::ArchiveDelivery;
use crate::presentation::errors::AppError;

/// 下载选中的图片并以 zip 附件返回
///
/// `POST /download`，请求体为 `{ "images": [...] }`。
/// 至少一张成功时返回压缩包，压缩包在响应体发送完毕后删除。
pub async fn download_images(
    Extension(service): Extension<Arc<FetchPackService>>,
    Json(payload): Json<DownloadRequestDto>,
) -> Result<Response, AppError> {
    let detail_limit = service.max_error_details();
    let job = service
        .fetch_and_pack(&payload.images)
        .await
        .map_err(|e| AppError::from(e).with_detail_limit(detail_limit))?;

    info!(
        "Job {}: {} of {} images packed, {} failed",
        job.id,
        job.succeeded(),
        job.outcomes.len(),
        job.failures().len()
    );

    let delivery = ArchiveDelivery::open(job.into_archive())
        .await
        .map_err(ServiceError::from)?;

    let disposition = format!(
        "attachment; filename=\"images_{}.zip\"",
        Utc::now().timestamp_millis()
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/zip"))
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, delivery.content_length())
        .body(Body::from_stream(delivery.into_stream()))
        .map_err(|e| AppError::from(ServiceError::Internal(e.to_string())))
}
