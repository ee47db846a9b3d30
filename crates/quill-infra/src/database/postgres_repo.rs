//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder};
use uuid::Uuid;

use quill_core::domain::{ListOptions, Post, PostPatch, SortBy, SortOrder, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

fn sort_column(sort_by: SortBy) -> post::Column {
    match sort_by {
        SortBy::CreatedAt => post::Column::CreatedAt,
        SortBy::UpdatedAt => post::Column::UpdatedAt,
    }
}

fn sort_direction(order: SortOrder) -> Order {
    match order {
        SortOrder::Ascending => Order::Asc,
        SortOrder::Descending => Order::Desc,
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, options: ListOptions) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by(sort_column(options.sort_by), sort_direction(options.sort_order))
            .all(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by(post::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError> {
        // Exact membership in the text[] column.
        let result = PostEntity::find()
            .filter(Expr::cust_with_values("? = ANY(tags)", [tag.to_owned()]))
            .order_by(post::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn apply_patch(
        &self,
        id: Uuid,
        patch: &PostPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        // Single UPDATE touching only the patched columns; the row write
        // is atomic on the store side.
        let mut query = PostEntity::update_many().filter(post::Column::Id.eq(id));

        if let Some(title) = &patch.title {
            query = query.col_expr(post::Column::Title, Expr::value(title.clone()));
        }
        if let Some(contents) = &patch.contents {
            query = query.col_expr(post::Column::Contents, Expr::value(contents.clone()));
        }
        if let Some(tags) = &patch.tags {
            query = query.col_expr(post::Column::Tags, Expr::value(tags.clone()));
        }
        query = query.col_expr(post::Column::UpdatedAt, Expr::value(updated_at));

        let result = query
            .exec(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }
}
