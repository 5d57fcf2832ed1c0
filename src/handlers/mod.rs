//! HTTP 处理器模块

pub mod auth;
pub mod health;
pub mod post;
pub mod profile;

use crate::error::AppError;
use axum::{extract::rejection::JsonRejection, Json};
use uuid::Uuid;

/// 解包 JSON 请求体，格式错误统一为 400
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        AppError::bad_request("Invalid input")
    })
}

/// 解析路径或查询参数中的资源 ID
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("Invalid {} ID format", kind)))
}
