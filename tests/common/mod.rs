//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use blog_service::{
    config::{
        AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig, StoreBackend,
        StoreConfig,
    },
    middleware::AppState,
    repository::Repositories,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

/// 创建测试配置（进程内存储，低成本 Argon2 参数）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
            request_timeout_secs: 30,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            token_ttl_secs: 3600,
            password_min_length: 8,
            allowed_email_domains: vec!["gmail.com".to_string()],
            password_hash_memory_kib: 1024,
            password_hash_iterations: 1,
            password_hash_parallelism: 1,
        },
    }
}

/// 创建测试应用状态
pub fn create_test_app_state() -> Arc<AppState> {
    let config = create_test_config();
    Arc::new(AppState::new(config, Repositories::in_memory()).expect("Failed to build app state"))
}

/// 创建测试路由
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let state = create_test_app_state();
    (blog_service::routes::create_router(state.clone()), state)
}

/// 发送请求并返回状态码与 JSON 响应体
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

/// 读取响应体
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// 注册测试用户
pub async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await
}

/// 登录并返回令牌
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", json);
    json["token"].as_str().unwrap().to_string()
}

/// 注册并登录，返回令牌
pub async fn register_and_login(app: &Router, name: &str, email: &str, password: &str) -> String {
    let (status, json) = register(app, name, email, password).await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", json);
    login(app, email, password).await
}

/// 创建文章并返回 ID
pub async fn create_post(app: &Router, token: &str, title: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/posts/create",
        Some(token),
        Some(json!({ "title": title, "content": "content" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create post failed: {}", json);
    json["post_id"].as_str().unwrap().to_string()
}
