//! User repository (账户数据访问)

use crate::{
    error::AppError,
    models::user::{NewUser, User},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Account store. Email is unique; `create` reports duplicates as `Conflict`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// 创建用户
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// 按 (id, email) 联合查找，只返回调用者自己的记录
    async fn find_owned(&self, id: Uuid, email: &str) -> Result<Option<User>, AppError>;

    /// 按 (id, email) 联合更新显示名
    async fn update_name(
        &self,
        id: Uuid,
        email: &str,
        name: &str,
    ) -> Result<Option<User>, AppError>;

    /// 存储健康检查
    async fn health_check(&self) -> Result<(), AppError>;
}

fn duplicate_email() -> AppError {
    AppError::Conflict("Email already in use".to_string())
}

// ==================== PostgreSQL ====================

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(duplicate_email()),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_owned(&self, id: Uuid, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND email = $2")
            .bind(id)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn update_name(
        &self,
        id: Uuid,
        email: &str,
        name: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $3, updated_at = NOW()
            WHERE id = $1 AND email = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

// ==================== 进程内存储 ====================

/// In-process account store keyed by id
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        // 持有写锁完成查重与插入
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(duplicate_email());
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_owned(&self, id: Uuid, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(&id).filter(|u| u.email == email).cloned())
    }

    async fn update_name(
        &self,
        id: Uuid,
        email: &str,
        name: &str,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id).filter(|u| u.email == email) else {
            return Ok(None);
        };

        user.name = name.to_string();
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
