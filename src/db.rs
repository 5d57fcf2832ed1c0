//! 存储初始化
//! 按配置选择存储后端；PostgreSQL 后端负责连接池与迁移

use crate::{
    config::{AppConfig, DatabaseConfig, StoreBackend},
    repository::Repositories,
};
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// 根据 `store.backend` 打开存储
pub async fn open_store(config: &AppConfig) -> Result<Repositories, DbError> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database).await?;
            run_migrations(&pool).await?;
            tracing::info!("PostgreSQL store ready");
            Ok(Repositories::postgres(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-process store; data is lost on restart");
            Ok(Repositories::in_memory())
        }
    }
}

/// 创建 PostgreSQL 连接池（`database.url` 必填）
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let db_url = config.url.as_ref().ok_or(DbError::MissingUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(db_url.expose_secret())
        .await
        .map_err(|e| {
            // 连接串中可能带有密码，只记录错误本身
            tracing::error!("Failed to connect to account store: {}", e);
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::debug!(max_connections = config.max_connections, "Store pool created");

    Ok(pool)
}

/// 执行 users / posts 表迁移
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        tracing::error!("Migration failed: {}", e);
        DbError::MigrationFailed(e.to_string())
    })
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database.url is required when store.backend = postgres")]
    MissingUrl,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
