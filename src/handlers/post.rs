//! 文章的 HTTP 处理器

use crate::{
    auth::AuthContext,
    error::{AppError, ErrorResponse},
    handlers::{json_body, parse_id},
    middleware::AppState,
    models::post::{CreatePostRequest, DeletePostQuery, Post, UpdatePostRequest},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 创建文章
#[utoipa::path(
    post,
    path = "/posts/create",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created; body is `{message, post_id, post}`"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;

    let post = state
        .post_service
        .create(&auth_context.identity, req)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Post created successfully",
            "post_id": post.id,
            "post": post
        })),
    ))
}

/// 列出全部文章
#[utoipa::path(
    get,
    path = "/posts",
    responses((status = 200, description = "All posts, newest first", body = [Post])),
    tag = "posts"
)]
pub async fn list_posts(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let posts = state.post_service.list().await?;

    Ok(Json(posts))
}

/// 获取文章详情
#[utoipa::path(
    get,
    path = "/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post id (UUID)")),
    responses(
        (status = 200, description = "The post", body = Post),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&post_id, "post")?;

    let post = state.post_service.get(id).await?;

    Ok(Json(post))
}

/// 更新文章
#[utoipa::path(
    put,
    path = "/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post id (UUID)")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated; body is `{message, post}`"),
        (status = 400, description = "Invalid id or body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Post not found or not owned by caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(post_id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&post_id, "post")?;
    let req = json_body(payload)?;

    let post = state
        .post_service
        .update(&auth_context.identity, id, req)
        .await?;

    Ok(Json(json!({
        "message": "Post updated successfully",
        "post": post
    })))
}

/// 删除文章（`DELETE /post?post_id=...`）
#[utoipa::path(
    delete,
    path = "/post",
    params(DeletePostQuery),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 400, description = "Missing or invalid post_id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Post not found or not owned by caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    query: Result<Query<DeletePostQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|_| AppError::bad_request("Invalid query"))?;
    let raw_id = query
        .post_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Post ID is required"))?;
    let id = parse_id(&raw_id, "post")?;

    state
        .post_service
        .delete(&auth_context.identity, id)
        .await?;

    Ok(Json(json!({
        "message": "Post deleted successfully"
    })))
}
