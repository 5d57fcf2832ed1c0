//! 认证相关的 HTTP 处理器

use crate::{
    error::{AppError, ErrorResponse},
    handlers::json_body,
    middleware::AppState,
    models::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        user::UserResponse,
    },
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 注册
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created; body is `{message, user}`"),
        (status = 400, description = "Invalid input, weak password or email already in use", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;

    let user = state.auth_service.register(req).await?;

    Ok(Json(json!({
        "message": "User registered successfully",
        "user": UserResponse::from(user)
    })))
}

/// 登录
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;

    let response = state.auth_service.login(req).await?;

    Ok(Json(response))
}
