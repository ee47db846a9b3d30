//! The post service: create, list, fetch, patch and delete posts.
//!
//! All "not found" outcomes are successful `None` / zero-count results;
//! errors are reserved for validation, authorization and store failures.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{ListOptions, Post, PostDraft, PostPatch};
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};

/// Store-level acknowledgment of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Post operations over the repository ports.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Create a post authored by `author_id`.
    ///
    /// The draft is validated before any store call; a missing or blank
    /// title fails with a violation naming `title`.
    pub async fn create_post(
        &self,
        author_id: Uuid,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        let violations = draft.validate();
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        let post = Post::new(author_id, draft);
        tracing::debug!(post_id = %post.id, author_id = %author_id, "Creating post");

        Ok(self.posts.save(post).await?)
    }

    /// List every post, sorted per the options (default: newest first).
    pub async fn list_all_posts(&self, options: ListOptions) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list(options).await?)
    }

    /// List the posts authored by `username`.
    ///
    /// An unknown username resolves to an empty list, not an error.
    pub async fn list_posts_by_author(&self, username: &str) -> Result<Vec<Post>, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(Vec::new());
        };

        Ok(self.posts.find_by_author(user.id).await?)
    }

    /// List the posts whose tag sequence contains `tag` exactly.
    pub async fn list_posts_by_tag(&self, tag: &str) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_tag(tag).await?)
    }

    /// Fetch a single post; `Ok(None)` when the id does not exist.
    pub async fn get_post_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.find_by_id(id).await?)
    }

    /// Apply a partial update to a post, refreshing `updated_at`.
    ///
    /// Only the post's author may update it; any other caller gets
    /// `DomainError::Forbidden` and the post is left untouched. A
    /// nonexistent id yields `Ok(None)`.
    pub async fn update_post(
        &self,
        author_id: Uuid,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let violations = patch.validate();
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        let Some(existing) = self.posts.find_by_id(id).await? else {
            return Ok(None);
        };
        self.check_ownership(&existing, author_id)?;

        Ok(self.posts.apply_patch(id, &patch, Utc::now()).await?)
    }

    /// Delete a post, reporting how many documents were removed.
    ///
    /// A nonexistent id is not an error: the result carries
    /// `deleted_count == 0`. Ownership is enforced as for updates.
    pub async fn delete_post(&self, author_id: Uuid, id: Uuid) -> Result<DeleteResult, DomainError> {
        let Some(existing) = self.posts.find_by_id(id).await? else {
            return Ok(DeleteResult { deleted_count: 0 });
        };
        self.check_ownership(&existing, author_id)?;

        let deleted_count = self.posts.delete(id).await?;
        tracing::debug!(post_id = %id, deleted_count, "Deleted post");

        Ok(DeleteResult { deleted_count })
    }

    fn check_ownership(&self, post: &Post, caller: Uuid) -> Result<(), DomainError> {
        if post.author_id != caller {
            return Err(DomainError::Forbidden(
                "only the author may modify this post".to_string(),
            ));
        }
        Ok(())
    }
}
