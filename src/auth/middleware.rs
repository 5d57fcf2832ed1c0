//! JWT 认证中间件
//!
//! 状态机：NoToken / Rejected 为终止失败状态，只有 Authenticated 才会进入下游处理器。

use crate::{
    auth::jwt::{Identity, JwtService},
    error::{AppError, AuthFailure},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// 认证上下文（附加到请求扩展，处理器以显式参数接收）
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
}

impl AuthContext {
    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn display_name(&self) -> &str {
        &self.identity.display_name
    }
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized(AuthFailure::MissingContext))
    }
}

/// 认证结果
#[derive(Debug)]
pub enum AuthOutcome {
    NoToken,
    Rejected(AuthFailure),
    Authenticated(Identity),
}

/// 从 Authorization 头提取令牌
///
/// 只去掉一个 `Bearer ` 前缀；令牌为空或带有首尾空白均视为格式错误。
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::MissingHeader)?
        .to_str()
        .map_err(|_| AuthFailure::MalformedScheme)?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() && token.trim() == token => Ok(token),
        _ => Err(AuthFailure::MalformedScheme),
    }
}

/// 根据请求头判定认证状态
pub fn authenticate(headers: &HeaderMap, jwt_service: &JwtService) -> AuthOutcome {
    let token = match extract_token(headers) {
        Ok(token) => token,
        Err(AuthFailure::MissingHeader) => return AuthOutcome::NoToken,
        Err(reason) => return AuthOutcome::Rejected(reason),
    };

    match jwt_service.validate(token) {
        Ok(identity) => AuthOutcome::Authenticated(identity),
        Err(AppError::Unauthorized(reason)) => AuthOutcome::Rejected(reason),
        Err(_) => AuthOutcome::Rejected(AuthFailure::Malformed),
    }
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match authenticate(req.headers(), &jwt_service) {
        AuthOutcome::Authenticated(identity) => {
            tracing::debug!(email = %identity.email, "Request authenticated");
            req.extensions_mut().insert(AuthContext { identity });
            Ok(next.run(req).await)
        }
        AuthOutcome::NoToken => Err(AppError::Unauthorized(AuthFailure::MissingHeader)),
        AuthOutcome::Rejected(reason) => Err(AppError::Unauthorized(reason)),
    }
}
