//! 个人资料的 HTTP 处理器

use crate::{
    auth::AuthContext,
    error::{AppError, ErrorResponse},
    handlers::{json_body, parse_id},
    middleware::AppState,
    models::user::{UpdateProfileRequest, UserResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 查看当前用户资料
#[utoipa::path(
    get,
    path = "/profile/view",
    responses(
        (status = 200, description = "Caller's profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
pub async fn view_profile(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.view_profile(&auth_context.identity).await?;

    Ok(Json(UserResponse::from(user)))
}

/// 更新当前用户资料
#[utoipa::path(
    put,
    path = "/profile/{id}",
    params(("id" = String, Path, description = "Profile id (UUID)")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated; body is `{message, user}`"),
        (status = 400, description = "Invalid id or body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Profile not found or not owned by caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "user")?;
    let req = json_body(payload)?;

    let user = state
        .auth_service
        .update_profile(&auth_context.identity, id, req)
        .await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": UserResponse::from(user)
    })))
}
