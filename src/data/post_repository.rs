use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
}

#[derive(Debug, Clone)]
pub struct PostPatch {
    pub title: String,
    pub content: String,
}

/// 1-based page addressing over the descending-by-date post feed.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Inserts a post; `date_posted` is set to the insertion instant.
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Mutates title/content only; `date_posted` and `author_id` are
    /// immutable after creation.
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self) -> Result<i64, DomainError>;
    async fn list_posts_by_author(
        &self,
        author_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_posts_by_author(&self, author_id: i64) -> Result<i64, DomainError>;
}
