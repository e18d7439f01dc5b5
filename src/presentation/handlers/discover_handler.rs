// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json, Query};
use std::sync::Arc;
use validator::Validate;

use crate::application::dto::{scrape_request::ScrapeQueryDto, scrape_response::ImagesResponseDto};
use crate::domain::services::{discovery_service::DiscoveryService, ServiceError};
use crate::presentation::errors::AppError;

/// 扫描页面中的图片
///
/// `GET /scrape?url=<页面地址>`，返回去重后的图片地址列表
pub async fn discover_images(
    Extension(service): Extension<Arc<DiscoveryService>>,
    Query(query): Query<ScrapeQueryDto>,
) -> Result<Json<ImagesResponseDto>, AppError> {
    let target = query.target();
    if !target.is_empty() {
        query
            .validate()
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid URL: {}", target)))?;
    }

    let images = service.discover(target).await?;
    Ok(Json(images.into()))
}
