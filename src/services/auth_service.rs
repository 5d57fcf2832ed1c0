//! 认证服务：注册、登录、个人资料

use crate::{
    auth::{
        normalize_email, CredentialValidator, Identity, JwtService, OwnershipGuard,
        PasswordHasher,
    },
    error::{AppError, AuthFailure},
    models::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        user::{NewUser, UpdateProfileRequest, User},
    },
    repository::UserRepository,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    jwt_service: Arc<JwtService>,
    validator: CredentialValidator,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        jwt_service: Arc<JwtService>,
        validator: CredentialValidator,
    ) -> Self {
        Self {
            users,
            hasher,
            jwt_service,
            validator,
        }
    }

    /// 用户注册
    ///
    /// 邮箱格式与密码强度任一不通过都直接拒绝，不会写入存储。
    /// 邮箱按小写存储，大小写不同的同一地址视为重复。
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        req.validate()?;
        self.validator.check_registration(&req.email, &req.password)?;

        let email = normalize_email(&req.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let name = req.display_name();
        let password_hash = self.hash_password(req.password).await?;

        // 并发注册同一邮箱时由存储层的唯一约束兜底
        let user = self
            .users
            .create(NewUser {
                name,
                email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// 用户登录
    ///
    /// 用户不存在与密码错误返回同一种错误，且都要完成一次 Argon2 校验。
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = self.users.find_by_email(&normalize_email(&req.email)).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

        if !self.verify_password(req.password, stored_hash).await? {
            tracing::info!(known_account = user.is_some(), "Login rejected");
            return Err(AppError::Unauthorized(AuthFailure::BadCredentials));
        }
        let user = user.ok_or(AppError::Unauthorized(AuthFailure::BadCredentials))?;

        let issued = self.jwt_service.issue(&user.email, &user.name)?;

        tracing::info!(user_id = %user.id, "Login succeeded");

        Ok(LoginResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_in: self.jwt_service.ttl().num_seconds(),
        })
    }

    /// 查看当前用户资料
    pub async fn view_profile(&self, identity: &Identity) -> Result<User, AppError> {
        self.users
            .find_by_email(&identity.email)
            .await?
            .ok_or(AppError::NotFound("profile"))
    }

    /// 更新当前用户资料（仅显示名，邮箱不可变）
    pub async fn update_profile(
        &self,
        identity: &Identity,
        id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        req.validate()?;

        let user = self
            .users
            .find_owned(id, &identity.email)
            .await?
            .ok_or(AppError::NotFound("profile"))?;
        OwnershipGuard::require(identity, &user)?;

        self.users
            .update_name(id, &identity.email, &req.name)
            .await?
            .ok_or(AppError::NotFound("profile"))
    }

    // Argon2 is CPU bound; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
    }

    async fn verify_password(
        &self,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SecurityConfig, repository::MemoryUserRepository};
    use secrecy::Secret;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: Secret::new("unit-test-secret-key-at-least-32-chars".to_string()),
            token_ttl_secs: 3600,
            password_min_length: 8,
            allowed_email_domains: vec!["gmail.com".to_string()],
            password_hash_memory_kib: 1024,
            password_hash_iterations: 1,
            password_hash_parallelism: 1,
        }
    }

    fn service() -> AuthService {
        let config = security();
        AuthService::new(
            Arc::new(MemoryUserRepository::new()),
            PasswordHasher::from_config(&config).unwrap(),
            Arc::new(JwtService::from_config(&config).unwrap()),
            CredentialValidator::from_config(&config),
        )
    }

    fn register_req(name: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "longpassword".to_string(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_without_name_uses_local_part() {
        let service = service();

        let user = service.register(register_req("", "writer@gmail.com")).await.unwrap();

        assert_eq!(user.name, "writer");
        assert_eq!(user.email, "writer@gmail.com");
    }

    #[tokio::test]
    async fn test_email_case_does_not_create_second_account() {
        let service = service();

        let user = service.register(register_req("User", "U@Gmail.com")).await.unwrap();
        assert_eq!(user.email, "u@gmail.com");

        let err = service
            .register(register_req("Other", "u@gmail.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let response = service
            .login(login_req("U@GMAIL.COM", "longpassword"))
            .await
            .unwrap();
        let identity = service.jwt_service.validate(&response.token).unwrap();
        assert_eq!(identity.email, "u@gmail.com");
    }

    #[tokio::test]
    async fn test_unknown_account_and_wrong_password_fail_alike() {
        let service = service();
        service.register(register_req("User", "u@gmail.com")).await.unwrap();

        let unknown = service
            .login(login_req("nobody@gmail.com", "longpassword"))
            .await
            .unwrap_err();
        let wrong = service
            .login(login_req("u@gmail.com", "wrongpassword"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::Unauthorized(AuthFailure::BadCredentials)));
        assert!(matches!(wrong, AppError::Unauthorized(AuthFailure::BadCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_account_still_runs_verification() {
        let service = service();

        // 不存在的账户走哑哈希校验，同样返回 false
        let verified = service
            .verify_password("longpassword".to_string(), None)
            .await
            .unwrap();
        assert!(!verified);
    }
}
