//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PostRepository, UserRepository};
use quill_core::service::PostService;
use quill_infra::database::{
    DatabaseConfig, DatabaseConnections, InMemoryPostRepository, InMemoryUserRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// With no `DATABASE_URL` (or a failed connection) the server runs
    /// on the in-memory repositories, which lose data on restart.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let (post_repo, user_repo): (Arc<dyn PostRepository>, Arc<dyn UserRepository>) =
            match db_config {
                Some(config) => match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        // One pool, shared by every repository.
                        let conn = Arc::new(connections.main);
                        (
                            Arc::new(PostgresPostRepository::new(conn.clone())),
                            Arc::new(PostgresUserRepository::new(conn)),
                        )
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Self::in_memory_repos()
                    }
                },
                None => {
                    tracing::warn!(
                        "DATABASE_URL not set. Running without database (in-memory mode)."
                    );
                    Self::in_memory_repos()
                }
            };

        tracing::info!("Application state initialized");

        Self {
            posts: PostService::new(post_repo, user_repo.clone()),
            users: user_repo,
        }
    }

    /// State backed entirely by in-memory repositories, used in tests.
    pub fn in_memory() -> Self {
        let (post_repo, user_repo) = Self::in_memory_repos();
        Self {
            posts: PostService::new(post_repo, user_repo.clone()),
            users: user_repo,
        }
    }

    fn in_memory_repos() -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        (
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}
