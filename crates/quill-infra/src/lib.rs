//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the database adapters and auth services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory repositories only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::DatabaseConfig;
pub use database::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtTokenService};
