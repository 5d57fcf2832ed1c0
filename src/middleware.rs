//! HTTP 中间件
//! 应用状态、请求追踪、请求超时

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{CredentialValidator, JwtService, PasswordHasher},
    config::AppConfig,
    error::AppError,
    repository::Repositories,
    services::{AuthService, PostService},
};

/// 应用状态
///
/// 签名密钥在启动时加载一次，之后只读，可在请求间无锁共享。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repositories: Repositories,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
}

impl AppState {
    /// 根据配置与存储构建全部服务
    pub fn new(config: AppConfig, repositories: Repositories) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config.security)?);
        let hasher = PasswordHasher::from_config(&config.security)?;
        let validator = CredentialValidator::from_config(&config.security);

        let auth_service = Arc::new(AuthService::new(
            repositories.users.clone(),
            hasher,
            jwt_service.clone(),
            validator,
        ));
        let post_service = Arc::new(PostService::new(repositories.posts.clone()));

        Ok(Self {
            config,
            repositories,
            jwt_service,
            auth_service,
            post_service,
        })
    }
}

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id（仅在请求追踪中间件的作用域内可用）
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    // 只记录路径，查询参数中可能带有标识符
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        // 错误响应体中的 request_id 与响应头保持一致
        let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 记录指标 - 使用静态字符串
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            _ => "OTHER",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            400 => "400",
            401 => "401",
            404 => "404",
            408 => "408",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// 请求超时中间件
/// 超时后丢弃处理器 future，其中正在等待的存储调用随之取消
pub async fn request_timeout_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = Duration::from_secs(state.config.server.request_timeout_secs);

    tokio::time::timeout(limit, next.run(req)).await.map_err(|_| {
        tracing::warn!(timeout_secs = limit.as_secs(), "Request timed out");
        AppError::Timeout
    })
}
