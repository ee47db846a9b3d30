use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a titled, taggable content record authored by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub contents: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post from a validated draft.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            contents: draft.contents,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Candidate fields for a new post, before validation.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub contents: Option<String>,
    pub tags: Vec<String>,
}

impl PostDraft {
    /// Check the draft against the post invariants.
    ///
    /// Pure function, independent of the storage backend; an empty vec
    /// means the draft is acceptable.
    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push(FieldViolation::new("title", "title is required"));
        }

        violations
    }
}

/// A single required-field or format violation, identified by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.field, self.message)
    }
}

/// Partial update to a post.
///
/// The fields here are the whitelist of what a caller may change;
/// `author_id`, `id` and the timestamps are never patchable. `None`
/// means "leave untouched".
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub contents: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.contents.is_none() && self.tags.is_none()
    }

    /// Validate the fields that are present.
    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                violations.push(FieldViolation::new("title", "title must not be empty"));
            }
        }

        violations
    }

    /// Apply the patch to a post in place, refreshing `updated_at`.
    pub fn apply_to(&self, post: &mut Post, updated_at: DateTime<Utc>) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(contents) = &self.contents {
            post.contents = Some(contents.clone());
        }
        if let Some(tags) = &self.tags {
            post.tags = tags.clone();
        }
        post.updated_at = updated_at;
    }
}

/// Which post field a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
}

/// Listing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Sorting options for post listings. The default is newest first by
/// creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}
