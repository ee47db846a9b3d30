//! Domain entities - the core business objects.

mod post;

mod user;

pub use post::{FieldViolation, ListOptions, Post, PostDraft, PostPatch, SortBy, SortOrder};
pub use user::User;
