//! OpenAPI 文档
//! 由处理器上的 `#[utoipa::path]` 注解生成，经 Swagger UI 提供

use crate::{
    error::{ErrorDetail, ErrorResponse},
    handlers,
    models::{post::Post, user::UserResponse},
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI JSON 路径
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Swagger UI 挂载路径
pub const SWAGGER_UI_PATH: &str = "/swagger";

/// 注册 Bearer 令牌认证方案
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Session token returned by POST /login"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAuth),
    info(
        title = "Blog service API",
        description = "Account registration, session tokens, profiles and owner-scoped posts."
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::profile::view_profile,
        handlers::profile::update_profile,
        handlers::post::create_post,
        handlers::post::list_posts,
        handlers::post::get_post,
        handlers::post::update_post,
        handlers::post::delete_post,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(UserResponse, Post, ErrorResponse, ErrorDetail)),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "profile", description = "Caller's own profile"),
        (name = "posts", description = "Blog posts; mutations are owner-only"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_documented() {
        let doc = ApiDoc::openapi();

        for path in [
            "/register",
            "/login",
            "/profile/view",
            "/profile/{id}",
            "/posts/create",
            "/posts",
            "/posts/{post_id}",
            "/post",
            "/health",
            "/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("UserResponse"));
        // 密码哈希不出现在任何公开模型中
        let json = serde_json::to_string(&components.schemas).unwrap();
        assert!(!json.contains("password_hash"));
    }
}
