use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ListOptions, Post, PostPatch, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// The store is assumed to offer per-document atomicity and nothing
/// more; there are no multi-document transactions behind this seam.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, returning the number of documents
    /// removed. A missing ID yields 0, not an error.
    async fn delete(&self, id: ID) -> Result<u64, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// List all posts, ordered per the options.
    async fn list(&self, options: ListOptions) -> Result<Vec<Post>, RepoError>;

    /// All posts by the given author, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// All posts whose tag sequence contains `tag` (exact match), newest first.
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError>;

    /// Apply a partial update to a single post as one atomic write,
    /// setting `updated_at`. Returns the updated post, or `None` if no
    /// post with that ID exists.
    async fn apply_patch(
        &self,
        id: Uuid,
        patch: &PostPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;
}
