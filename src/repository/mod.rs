//! Document store layer
//! 存储实现由配置选择：PostgreSQL 或进程内存储

pub mod post_repo;
pub mod user_repo;

pub use post_repo::*;
pub use user_repo::*;

use sqlx::PgPool;
use std::sync::Arc;

/// 服务层使用的全部存储句柄
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            posts: Arc::new(MemoryPostRepository::new()),
        }
    }
}
