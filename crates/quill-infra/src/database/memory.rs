//! In-memory repositories - used as fallback when no database is
//! configured, and as the test double for service-level tests.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{ListOptions, Post, PostPatch, SortBy, SortOrder, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

/// In-memory user repository over a HashMap with async RwLock.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        // Mirror the unique index on username.
        let taken = store
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        Ok(u64::from(store.remove(&id).is_some()))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}

/// In-memory post repository over a HashMap with async RwLock.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sort(posts: &mut [Post], options: ListOptions) {
        posts.sort_by_key(|post| match options.sort_by {
            SortBy::CreatedAt => post.created_at,
            SortBy::UpdatedAt => post.updated_at,
        });
        if options.sort_order == SortOrder::Descending {
            posts.reverse();
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        Ok(u64::from(store.remove(&id).is_some()))
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, options: ListOptions) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store.values().cloned().collect();
        Self::sort(&mut posts, options);
        Ok(posts)
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        Self::sort(&mut posts, ListOptions::default());
        Ok(posts)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| p.tags.iter().any(|t| t == tag))
            .cloned()
            .collect();
        Self::sort(&mut posts, ListOptions::default());
        Ok(posts)
    }

    async fn apply_patch(
        &self,
        id: Uuid,
        patch: &PostPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        let Some(post) = store.get_mut(&id) else {
            return Ok(None);
        };

        patch.apply_to(post, updated_at);
        Ok(Some(post.clone()))
    }
}
