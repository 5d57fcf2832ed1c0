//! 文章服务：创建、查询、修改、删除

use crate::{
    auth::{Identity, OwnershipGuard},
    error::AppError,
    models::post::{CreatePostRequest, NewPost, Post, UpdatePostRequest},
    repository::PostRepository,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// 创建文章，作者与所有者取自调用者身份
    pub async fn create(&self, identity: &Identity, req: CreatePostRequest) -> Result<Post, AppError> {
        req.validate()?;

        let post = self
            .posts
            .create(NewPost {
                owner_email: identity.email.clone(),
                author: identity.display_name.clone(),
                title: req.title,
                content: req.content,
            })
            .await?;

        tracing::info!(post_id = %post.id, "Post created");

        Ok(post)
    }

    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        self.posts.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, AppError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("post"))
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post, AppError> {
        req.validate()?;

        let post = self
            .posts
            .find_owned(id, &identity.email)
            .await?
            .ok_or(AppError::NotFound("post"))?;
        OwnershipGuard::require(identity, &post)?;

        let post = self
            .posts
            .update_owned(id, &identity.email, &req.title, &req.content)
            .await?
            .ok_or(AppError::NotFound("post"))?;

        tracing::info!(post_id = %post.id, "Post updated");

        Ok(post)
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), AppError> {
        let post = self
            .posts
            .find_owned(id, &identity.email)
            .await?
            .ok_or(AppError::NotFound("post"))?;
        OwnershipGuard::require(identity, &post)?;

        if !self.posts.delete_owned(id, &identity.email).await? {
            return Err(AppError::NotFound("post"));
        }

        tracing::info!(post_id = %id, "Post deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryPostRepository;
    use chrono::Utc;

    fn identity(email: &str) -> Identity {
        let now = Utc::now();
        Identity {
            email: email.to_string(),
            display_name: "Alice".to_string(),
            issued_at: now,
            expires_at: now + chrono::Duration::hours(1),
        }
    }

    fn service() -> PostService {
        PostService::new(Arc::new(MemoryPostRepository::new()))
    }

    fn create_req(title: &str) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_author_from_identity() {
        let service = service();
        let post = service.create(&identity("a@gmail.com"), create_req("Hi")).await.unwrap();

        assert_eq!(post.owner_email, "a@gmail.com");
        assert_eq!(post.author, "Alice");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let err = service()
            .create(&identity("a@gmail.com"), create_req(""))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 400);
    }

    #[tokio::test]
    async fn test_update_by_other_user_is_not_found() {
        let service = service();
        let post = service.create(&identity("a@gmail.com"), create_req("Hi")).await.unwrap();

        let err = service
            .update(
                &identity("b@gmail.com"),
                post.id,
                UpdatePostRequest {
                    title: "Pwned".to_string(),
                    content: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(service.get(post.id).await.unwrap().title, "Hi");
    }

    #[tokio::test]
    async fn test_delete_missing_and_foreign_look_the_same() {
        let service = service();
        let post = service.create(&identity("a@gmail.com"), create_req("Hi")).await.unwrap();

        let foreign = service.delete(&identity("b@gmail.com"), post.id).await.unwrap_err();
        let missing = service.delete(&identity("b@gmail.com"), Uuid::new_v4()).await.unwrap_err();

        assert_eq!(foreign.code(), missing.code());
        assert_eq!(foreign.user_message(), missing.user_message());

        service.delete(&identity("a@gmail.com"), post.id).await.unwrap();
        assert!(service.get(post.id).await.is_err());
    }
}
