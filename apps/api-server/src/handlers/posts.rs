//! Post handlers - the REST surface over the post service.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{ListOptions, Post, PostDraft, PostPatch, SortBy, SortOrder};
use quill_shared::dto::{CreatePostRequest, ListPostsQuery, PostResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        contents: post.contents,
        tags: post.tags,
        author: post.author_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// Translate the wire-level sort parameters, rejecting unknown values.
fn parse_list_options(query: &ListPostsQuery) -> Result<ListOptions, AppError> {
    let sort_by = match query.sort_by.as_deref() {
        None | Some("createdAt") => SortBy::CreatedAt,
        Some("updatedAt") => SortBy::UpdatedAt,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown sortBy value: {other}"
            )));
        }
    };

    let sort_order = match query.sort_order.as_deref() {
        None | Some("descending") => SortOrder::Descending,
        Some("ascending") => SortOrder::Ascending,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown sortOrder value: {other}"
            )));
        }
    };

    Ok(ListOptions {
        sort_by,
        sort_order,
    })
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = PostDraft {
        title: req.title,
        contents: req.contents,
        tags: req.tags,
    };

    let post = state.posts.create_post(identity.user_id, draft).await?;
    Ok(HttpResponse::Created().json(to_response(post)))
}

/// GET /api/posts?sortBy=&sortOrder=&author=&tag=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    if query.author.is_some() && query.tag.is_some() {
        return Err(AppError::BadRequest(
            "Query posts by either author or tag, not both".to_string(),
        ));
    }

    let posts = if let Some(author) = &query.author {
        state.posts.list_posts_by_author(author).await?
    } else if let Some(tag) = &query.tag {
        state.posts.list_posts_by_tag(tag).await?
    } else {
        let options = parse_list_options(&query)?;
        state.posts.list_all_posts(options).await?
    };

    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    match state.posts.get_post_by_id(id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(to_response(post))),
        None => Err(AppError::NotFound(format!("Post {id} not found"))),
    }
}

/// PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        contents: req.contents,
        tags: req.tags,
    };

    match state.posts.update_post(identity.user_id, id, patch).await? {
        Some(post) => Ok(HttpResponse::Ok().json(to_response(post))),
        None => Err(AppError::NotFound(format!("Post {id} not found"))),
    }
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let result = state.posts.delete_post(identity.user_id, id).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(format!("Post {id} not found")));
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test};

    use quill_core::ports::{PasswordService, TokenService};
    use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use quill_shared::dto::{AuthResponse, PostResponse, SignupRequest};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    use super::*;

    #[actix_web::test]
    async fn sort_parameters_are_parsed_and_validated() {
        let query = ListPostsQuery {
            sort_by: Some("updatedAt".to_string()),
            sort_order: Some("ascending".to_string()),
            ..Default::default()
        };
        let options = parse_list_options(&query).unwrap();
        assert_eq!(options.sort_by, SortBy::UpdatedAt);
        assert_eq!(options.sort_order, SortOrder::Ascending);

        assert_eq!(
            parse_list_options(&ListPostsQuery::default())
                .unwrap()
                .sort_by,
            SortBy::CreatedAt
        );

        let bad = ListPostsQuery {
            sort_by: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(parse_list_options(&bad).is_err());
    }

    fn test_services() -> (Arc<dyn TokenService>, Arc<dyn PasswordService>) {
        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }));
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        (token_service, password_service)
    }

    #[actix_web::test]
    async fn create_requires_a_bearer_token() {
        let (token_service, password_service) = test_services();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory()))
                .app_data(web::Data::new(token_service))
                .app_data(web::Data::new(password_service))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(CreatePostRequest {
                title: "No token".to_string(),
                ..Default::default()
            })
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn signup_create_and_fetch_round_trip() {
        let (token_service, password_service) = test_services();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory()))
                .app_data(web::Data::new(token_service))
                .app_data(web::Data::new(password_service))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(SignupRequest {
                username: "dan".to_string(),
                password: "hunter2hunter2".to_string(),
            })
            .to_request();
        let auth: AuthResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((
                "Authorization",
                format!("Bearer {}", auth.access_token),
            ))
            .set_json(CreatePostRequest {
                title: "Hello actix".to_string(),
                tags: vec!["actix".to_string()],
                ..Default::default()
            })
            .to_request();
        let created: PostResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created.title, "Hello actix");

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", created.id))
            .to_request();
        let fetched: PostResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched.id, created.id);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", Uuid::nil()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
