use serde::Serialize;

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::ownership::can_modify;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
use crate::domain::user::User;

/// One page of the post feed. Pages are 1-based; a page past the end is
/// empty but still reports correct `has_next`/`has_prev` flags.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PostPage {
    fn new(items: Vec<Post>, pagination: Pagination, total: i64) -> Self {
        let total_pages = (total.max(0) as u64).div_ceil(pagination.page_size as u64) as u32;
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1 && total_pages > 0,
        }
    }
}

/// Post CRUD and the paginated feed. Mutations re-check ownership against
/// the acting principal on every call.
pub struct BlogService<P: PostRepository, U: UserRepository> {
    posts: P,
    users: U,
}

impl<P: PostRepository, U: UserRepository> BlogService<P, U> {
    pub fn new(posts: P, users: U) -> Self {
        Self { posts, users }
    }

    pub async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            author_id,
        };
        self.posts.create_post(new_post).await
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {id}")))
    }

    /// Fails closed: a non-author gets `Forbidden` and the post is left
    /// untouched.
    pub async fn update_post(
        &self,
        actor: &User,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let existing = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;
        if !can_modify(actor, &existing) {
            return Err(DomainError::Forbidden);
        }

        let patch = PostPatch {
            title: req.title,
            content: req.content,
        };
        self.posts
            .update_post(post_id, patch)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))
    }

    pub async fn delete_post(&self, actor: &User, post_id: i64) -> Result<(), DomainError> {
        let existing = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;
        if !can_modify(actor, &existing) {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.posts.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(())
    }

    pub async fn list_posts(&self, page: u32, page_size: u32) -> Result<PostPage, DomainError> {
        let pagination = validate_pagination(page, page_size)?;
        let items = self.posts.list_posts(pagination).await?;
        let total = self.posts.count_posts().await?;

        Ok(PostPage::new(items, pagination, total))
    }

    /// Same contract as [`BlogService::list_posts`], scoped to one author.
    /// Unknown usernames fail with `NotFound` rather than an empty feed.
    pub async fn list_posts_by_author(
        &self,
        username: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PostPage, DomainError> {
        let pagination = validate_pagination(page, page_size)?;
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(DomainError::NotFound(format!("user: {username}")))?;

        let items = self
            .posts
            .list_posts_by_author(author.user.id, pagination)
            .await?;
        let total = self.posts.count_posts_by_author(author.user.id).await?;

        Ok(PostPage::new(items, pagination, total))
    }
}

fn validate_pagination(page: u32, page_size: u32) -> Result<Pagination, DomainError> {
    if page < 1 {
        return Err(DomainError::Validation {
            field: "page",
            message: "must be >= 1",
        });
    }
    if page_size < 1 {
        return Err(DomainError::Validation {
            field: "page_size",
            message: "must be >= 1",
        });
    }
    Ok(Pagination { page, page_size })
}
