//! 统一错误模型
//! 定义所有错误类型和错误响应格式
//!
//! 每个错误都有两层信息：内部原因（仅写入日志）和对外的粗粒度分类。
//! 对外分类刻意统一，调用方无法区分令牌是被篡改、过期还是缺失，
//! 也无法区分资源是不存在还是属于他人。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 认证失败的内部原因，仅用于诊断日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("authorization header missing")]
    MissingHeader,

    #[error("authorization header is not a bearer credential")]
    MalformedScheme,

    #[error("token could not be parsed")]
    Malformed,

    #[error("token signature mismatch")]
    Tampered,

    #[error("token expired")]
    Expired,

    #[error("email or password mismatch")]
    BadCredentials,

    #[error("no verified identity on request")]
    MissingContext,
}

/// 对外可见的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InputError,
    Unauthorized,
    NotFoundOrForbidden,
    Conflict,
    Timeout,
    Internal,
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(AuthFailure),

    #[error("Resource not found or not owned: {0}")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取对外分类
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::BadRequest(_) => ErrorClass::InputError,
            AppError::Unauthorized(_) => ErrorClass::Unauthorized,
            AppError::NotFound(_) => ErrorClass::NotFoundOrForbidden,
            AppError::Conflict(_) => ErrorClass::Conflict,
            AppError::Timeout => ErrorClass::Timeout,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self.class() {
            ErrorClass::InputError | ErrorClass::Conflict => StatusCode::BAD_REQUEST,
            ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorClass::NotFoundOrForbidden => StatusCode::NOT_FOUND,
            ErrorClass::Timeout => StatusCode::REQUEST_TIMEOUT,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Unauthorized(_) => "Unauthorized".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::Timeout => "Request timed out".to_string(),
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    // 便捷方法
    pub fn bad_request(msg: &str) -> Self {
        AppError::BadRequest(msg.to_string())
    }

    pub fn internal_error(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

/// 错误响应 DTO
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = crate::middleware::current_request_id()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 记录错误日志：内部错误记 error，客户端错误仅记 debug
        match self.class() {
            ErrorClass::Internal => tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            ),
            _ => tracing::debug!(
                code = self.code(),
                reason = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            ),
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从 validator::ValidationErrors 转换
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::BadRequest(e.to_string())
    }
}
