//! Application services - the operations exposed to the HTTP layer.

mod posts;

pub use posts::{DeleteResult, PostService};
