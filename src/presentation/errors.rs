// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domain::services::ServiceError;

/// 错误响应中默认展示的失败原因条数
pub const DEFAULT_DETAIL_LIMIT: usize = 3;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口。
/// 领域错误按类别映射为状态码：客户端错误为 400，其余为 500。
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
    detail_limit: usize,
}

impl AppError {
    /// 设置 `details` 字段最多包含的失败原因条数
    pub fn with_detail_limit(mut self, limit: usize) -> Self {
        self.detail_limit = limit;
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_message = self.inner.to_string();

        match self.inner.downcast_ref::<ServiceError>() {
            Some(ServiceError::AllDownloadsFailed { failures }) => {
                let details: Vec<&String> = failures.iter().take(self.detail_limit).collect();
                let body = Json(json!({ "error": error_message, "details": details }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            Some(service_error) if service_error.is_client_error() => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error_message }))).into_response()
            }
            _ => {
                error!("Request failed: {:#}", self.inner);
                let body = Json(json!({ "error": error_message }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            inner: err.into(),
            detail_limit: DEFAULT_DETAIL_LIMIT,
        }
    }
}
