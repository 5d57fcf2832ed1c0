//! Post repository (文章数据访问)
//!
//! 所有修改操作都按 (id, owner_email) 联合过滤，读取与所有权判断在同一次查询内完成。

use crate::{
    error::AppError,
    models::post::{NewPost, Post},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, AppError>;

    /// 全部文章，按创建时间倒序
    async fn list(&self) -> Result<Vec<Post>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    async fn find_owned(&self, id: Uuid, owner_email: &str) -> Result<Option<Post>, AppError>;

    async fn update_owned(
        &self,
        id: Uuid,
        owner_email: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, AppError>;

    /// 返回是否删除了记录
    async fn delete_owned(&self, id: Uuid, owner_email: &str) -> Result<bool, AppError>;
}

// ==================== PostgreSQL ====================

pub struct PgPostRepository {
    db: PgPool,
}

impl PgPostRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, owner_email, title, content, author, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&post.owner_email)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .fetch_one(&self.db)
        .await?;

        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await?;

        Ok(posts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(post)
    }

    async fn find_owned(&self, id: Uuid, owner_email: &str) -> Result<Option<Post>, AppError> {
        let post =
            sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1 AND owner_email = $2")
                .bind(id)
                .bind(owner_email)
                .fetch_optional(&self.db)
                .await?;

        Ok(post)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner_email: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $3, content = $4, updated_at = NOW()
            WHERE id = $1 AND owner_email = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_email)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.db)
        .await?;

        Ok(post)
    }

    async fn delete_owned(&self, id: Uuid, owner_email: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND owner_email = $2")
            .bind(id)
            .bind(owner_email)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ==================== 进程内存储 ====================

#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, AppError> {
        let now = Utc::now();
        let record = Post {
            id: Uuid::new_v4(),
            owner_email: post.owner_email,
            title: post.title,
            content: post.content,
            author: post.author,
            created_at: now,
            updated_at: now,
        };

        self.posts.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_owned(&self, id: Uuid, owner_email: &str) -> Result<Option<Post>, AppError> {
        let posts = self.posts.read().await;
        Ok(posts.get(&id).filter(|p| p.owner_email == owner_email).cloned())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner_email: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>, AppError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&id).filter(|p| p.owner_email == owner_email) else {
            return Ok(None);
        };

        post.title = title.to_string();
        post.content = content.to_string();
        post.updated_at = Utc::now();

        Ok(Some(post.clone()))
    }

    async fn delete_owned(&self, id: Uuid, owner_email: &str) -> Result<bool, AppError> {
        let mut posts = self.posts.write().await;
        match posts.get(&id) {
            Some(post) if post.owner_email == owner_email => {
                posts.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(owner: &str, title: &str) -> NewPost {
        NewPost {
            owner_email: owner.to_string(),
            author: "Author".to_string(),
            title: title.to_string(),
            content: "content".to_string(),
        }
    }

    #[tokio::test]
    async fn test_foreign_owner_cannot_mutate() {
        let repo = MemoryPostRepository::new();
        let post = repo.create(new_post("a@gmail.com", "Hello")).await.unwrap();

        assert!(repo.find_owned(post.id, "b@gmail.com").await.unwrap().is_none());
        assert!(repo
            .update_owned(post.id, "b@gmail.com", "Pwned", "")
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete_owned(post.id, "b@gmail.com").await.unwrap());

        let unchanged = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(unchanged.title, "Hello");
    }

    #[tokio::test]
    async fn test_owner_update_keeps_owner_and_author() {
        let repo = MemoryPostRepository::new();
        let post = repo.create(new_post("a@gmail.com", "Hello")).await.unwrap();

        let updated = repo
            .update_owned(post.id, "a@gmail.com", "Edited", "new body")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Edited");
        assert_eq!(updated.content, "new body");
        assert_eq!(updated.owner_email, "a@gmail.com");
        assert_eq!(updated.author, "Author");
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn test_owner_delete() {
        let repo = MemoryPostRepository::new();
        let post = repo.create(new_post("a@gmail.com", "Hello")).await.unwrap();

        assert!(repo.delete_owned(post.id, "a@gmail.com").await.unwrap());
        assert!(repo.find_by_id(post.id).await.unwrap().is_none());
        assert!(!repo.delete_owned(post.id, "a@gmail.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = MemoryPostRepository::new();
        let first = repo.create(new_post("a@gmail.com", "first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create(new_post("b@gmail.com", "second")).await.unwrap();

        let posts = repo.list().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, second.id);
        assert_eq!(posts[1].id, first.id);
    }
}
