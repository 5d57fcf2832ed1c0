//! Blog post models

use crate::auth::OwnedResource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub owner_email: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Post {
    const KIND: &'static str = "post";

    fn owner_email(&self) -> &str {
        &self.owner_email
    }
}

/// Fields required to persist a new post; owner and author come from the caller's identity
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_email: String,
    pub author: String,
    pub title: String,
    pub content: String,
}

/// Create post request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 100000, message = "content too long"))]
    pub content: String,
}

/// Update post request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 100000, message = "content too long"))]
    pub content: String,
}

/// Delete post query (`DELETE /post?post_id=...`)
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeletePostQuery {
    /// Id of the post to delete
    pub post_id: Option<String>,
}
