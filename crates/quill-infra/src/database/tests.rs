use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{ListOptions, PostDraft, PostPatch, SortBy, SortOrder, User};
use quill_core::ports::BaseRepository;
use quill_core::service::PostService;

use super::memory::{InMemoryPostRepository, InMemoryUserRepository};

struct Fixture {
    service: PostService,
    author: User,
    sample_titles: Vec<&'static str>,
}

/// One author with three posts, created in order with distinct
/// timestamps: "Learning Redux" [redux], "Learn React Hooks" [react],
/// "Full-Stack React Projects" [react, nodejs].
async fn fixture() -> Fixture {
    let posts = Arc::new(InMemoryPostRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());

    let author = users
        .save(User::new("dan".to_string(), "argon2-hash".to_string()))
        .await
        .unwrap();

    let service = PostService::new(posts, users);

    let samples = [
        ("Learning Redux", vec!["redux"]),
        ("Learn React Hooks", vec!["react"]),
        ("Full-Stack React Projects", vec!["react", "nodejs"]),
    ];
    for (title, tags) in &samples {
        service
            .create_post(
                author.id,
                PostDraft {
                    title: (*title).to_string(),
                    tags: tags.iter().map(|t| (*t).to_string()).collect(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        // Keep creation timestamps strictly ordered.
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    Fixture {
        service,
        author,
        sample_titles: samples.iter().map(|(t, _)| *t).collect(),
    }
}

#[tokio::test]
async fn create_without_title_fails_with_violation_naming_title() {
    let f = fixture().await;

    let result = f
        .service
        .create_post(
            f.author.id,
            PostDraft {
                contents: Some("Post with no title".to_string()),
                tags: vec!["empty".to_string()],
                ..Default::default()
            },
        )
        .await;

    match result {
        Err(DomainError::Validation(violations)) => {
            assert!(violations.iter().any(|v| v.field == "title"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_with_only_a_title_assigns_id_and_timestamps() {
    let f = fixture().await;

    let post = f
        .service
        .create_post(
            f.author.id,
            PostDraft {
                title: "Only a title".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_ne!(post.id, Uuid::nil());
    assert_eq!(post.author_id, f.author.id);
    assert_eq!(post.created_at, post.updated_at);

    let found = f.service.get_post_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(found.title, "Only a title");
    assert!(found.contents.is_none());
    assert!(found.tags.is_empty());
}

#[tokio::test]
async fn list_returns_all_posts_newest_first_by_default() {
    let f = fixture().await;

    let posts = f
        .service
        .list_all_posts(ListOptions::default())
        .await
        .unwrap();

    assert_eq!(posts.len(), 3);
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    let newest_first: Vec<&str> = f.sample_titles.iter().rev().copied().collect();
    assert_eq!(titles, newest_first);
}

#[tokio::test]
async fn list_honors_sort_options() {
    let f = fixture().await;

    let posts = f
        .service
        .list_all_posts(ListOptions {
            sort_by: SortBy::UpdatedAt,
            sort_order: SortOrder::Ascending,
        })
        .await
        .unwrap();

    let updated: Vec<_> = posts.iter().map(|p| p.updated_at).collect();
    let mut sorted = updated.clone();
    sorted.sort();
    assert_eq!(updated, sorted);
    assert_eq!(posts[0].title, f.sample_titles[0]);
}

#[tokio::test]
async fn list_by_author_returns_exactly_their_posts() {
    let f = fixture().await;

    let posts = f.service.list_posts_by_author("dan").await.unwrap();
    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|p| p.author_id == f.author.id));
}

#[tokio::test]
async fn list_by_unknown_author_is_empty_not_an_error() {
    let f = fixture().await;

    let posts = f.service.list_posts_by_author("nobody").await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn list_by_tag_matches_membership_exactly() {
    let f = fixture().await;

    let posts = f.service.list_posts_by_tag("nodejs").await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Full-Stack React Projects");

    let react = f.service.list_posts_by_tag("react").await.unwrap();
    assert_eq!(react.len(), 2);
}

#[tokio::test]
async fn get_by_nonexistent_id_returns_none() {
    let f = fixture().await;

    let post = f.service.get_post_by_id(Uuid::nil()).await.unwrap();
    assert!(post.is_none());
}

#[tokio::test]
async fn update_changes_only_the_patched_field() {
    let f = fixture().await;
    let before = f.service.list_posts_by_tag("redux").await.unwrap().remove(0);

    tokio::time::sleep(Duration::from_millis(5)).await;
    let updated = f
        .service
        .update_post(
            f.author.id,
            before.id,
            PostPatch {
                contents: Some("Test Update".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.contents.as_deref(), Some("Test Update"));
    assert_eq!(updated.title, "Learning Redux");
    assert_eq!(updated.tags, vec!["redux".to_string()]);
    assert!(updated.updated_at > before.updated_at);
    assert_eq!(updated.created_at, before.created_at);
}

#[tokio::test]
async fn update_of_nonexistent_id_returns_none() {
    let f = fixture().await;

    let result = f
        .service
        .update_post(
            f.author.id,
            Uuid::nil(),
            PostPatch {
                contents: Some("Test Update".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn update_by_non_author_is_forbidden_and_leaves_post_untouched() {
    let f = fixture().await;
    let post = f.service.list_posts_by_tag("redux").await.unwrap().remove(0);
    let stranger = Uuid::new_v4();

    let result = f
        .service
        .update_post(
            stranger,
            post.id,
            PostPatch {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    let unchanged = f.service.get_post_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Learning Redux");
}

#[tokio::test]
async fn update_with_blank_title_is_a_validation_error() {
    let f = fixture().await;
    let post = f.service.list_posts_by_tag("redux").await.unwrap().remove(0);

    let result = f
        .service
        .update_post(
            f.author.id,
            post.id,
            PostPatch {
                title: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn delete_removes_the_post_and_reports_count() {
    let f = fixture().await;
    let post = f.service.list_posts_by_tag("redux").await.unwrap().remove(0);

    let result = f.service.delete_post(f.author.id, post.id).await.unwrap();
    assert_eq!(result.deleted_count, 1);

    let gone = f.service.get_post_by_id(post.id).await.unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn delete_of_nonexistent_id_reports_zero_not_an_error() {
    let f = fixture().await;

    let result = f.service.delete_post(f.author.id, Uuid::nil()).await.unwrap();
    assert_eq!(result.deleted_count, 0);
}

#[tokio::test]
async fn delete_by_non_author_is_forbidden() {
    let f = fixture().await;
    let post = f.service.list_posts_by_tag("redux").await.unwrap().remove(0);

    let result = f.service.delete_post(Uuid::new_v4(), post.id).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    let still_there = f.service.get_post_by_id(post.id).await.unwrap();
    assert!(still_there.is_some());
}

#[cfg(feature = "postgres")]
mod postgres {
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use quill_core::domain::{Post, PostDraft, User};
    use quill_core::ports::{BaseRepository, UserRepository};

    use crate::database::entity::{post, user};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

    #[tokio::test]
    async fn find_post_by_id_maps_the_row_to_the_domain() {
        let post_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: post_id,
                author_id,
                title: "Hello Postgres".to_owned(),
                contents: Some("Stored in a posts table".to_owned()),
                tags: vec!["postgres".to_owned()],
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let found = result.unwrap();
        assert_eq!(found.id, post_id);
        assert_eq!(found.author_id, author_id);
        assert_eq!(found.title, "Hello Postgres");
        assert_eq!(found.tags, vec!["postgres".to_owned()]);
    }

    #[tokio::test]
    async fn save_of_a_new_post_inserts_the_row() {
        // A fresh domain entity carries its generated id, so the write
        // must be an INSERT; an UPDATE would match no row and fail.
        let new_post = Post::new(
            Uuid::new_v4(),
            PostDraft {
                title: "Hello Postgres".to_owned(),
                contents: Some("Stored in a posts table".to_owned()),
                tags: vec!["postgres".to_owned()],
            },
        );

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: new_post.id,
                author_id: new_post.author_id,
                title: new_post.title.clone(),
                contents: new_post.contents.clone(),
                tags: new_post.tags.clone(),
                created_at: new_post.created_at.into(),
                updated_at: new_post.updated_at.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let saved: Post = repo.save(new_post.clone()).await.unwrap();
        assert_eq!(saved.id, new_post.id);
        assert_eq!(saved.title, "Hello Postgres");
    }

    #[tokio::test]
    async fn find_user_by_username_maps_the_row_to_the_domain() {
        let user_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                username: "dan".to_owned(),
                password_hash: "argon2-hash".to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(Arc::new(db));

        let result: Option<User> = repo.find_by_username("dan").await.unwrap();
        assert_eq!(result.unwrap().id, user_id);
    }
}
