//! # Quill Client
//!
//! Thin wrappers over the Quill HTTP API: one method per endpoint,
//! deserializing into the shared DTOs. The only logic here is attaching
//! the bearer token when one is set.

use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use quill_shared::ErrorResponse;
use quill_shared::dto::{
    AuthResponse, CreatePostRequest, ListPostsQuery, LoginRequest, PostResponse, SignupRequest,
    UpdatePostRequest,
};

/// Client errors: transport failures, or an error body from the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {}: {}", .0.status, .0.title)]
    Api(ErrorResponse),

    #[error("configuration error: {0}")]
    Config(String),
}

/// HTTP client for the Quill API.
#[derive(Debug, Clone)]
pub struct QuillClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl QuillClient {
    /// Build a client against an explicit base URL, e.g.
    /// `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Build a client from the `BACKEND_URL` environment variable.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("BACKEND_URL")
            .map_err(|_| ClientError::Config("BACKEND_URL is not set".to_string()))?;
        Ok(Self::new(base_url))
    }

    /// Attach a bearer token to subsequent requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// POST /auth/signup
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/signup"))
            .json(request)
            .send()
            .await?;
        decode(res).await
    }

    /// POST /auth/login
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;
        decode(res).await
    }

    /// GET /posts
    pub async fn get_posts(&self, query: &ListPostsQuery) -> Result<Vec<PostResponse>, ClientError> {
        let res = self.http.get(self.url("/posts")).query(query).send().await?;
        decode(res).await
    }

    /// GET /posts/{id}
    pub async fn get_post_by_id(&self, id: Uuid) -> Result<PostResponse, ClientError> {
        let res = self.http.get(self.url(&format!("/posts/{id}"))).send().await?;
        decode(res).await
    }

    /// POST /posts (auth required)
    pub async fn create_post(&self, post: &CreatePostRequest) -> Result<PostResponse, ClientError> {
        let res = self
            .authorize(self.http.post(self.url("/posts")))
            .json(post)
            .send()
            .await?;
        decode(res).await
    }

    /// PATCH /posts/{id} (auth required)
    pub async fn update_post(
        &self,
        id: Uuid,
        patch: &UpdatePostRequest,
    ) -> Result<PostResponse, ClientError> {
        let res = self
            .authorize(self.http.patch(self.url(&format!("/posts/{id}"))))
            .json(patch)
            .send()
            .await?;
        decode(res).await
    }

    /// DELETE /posts/{id} (auth required)
    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        let res = self
            .authorize(self.http.delete(self.url(&format!("/posts/{id}"))))
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(());
        }
        Err(api_error(res).await)
    }
}

async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
    if res.status().is_success() {
        return Ok(res.json::<T>().await?);
    }
    Err(api_error(res).await)
}

async fn api_error(res: reqwest::Response) -> ClientError {
    let status = res.status().as_u16();
    match res.json::<ErrorResponse>().await {
        Ok(body) => ClientError::Api(body),
        Err(_) => ClientError::Api(ErrorResponse::new(status, "Unexpected error body")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = QuillClient::new("http://localhost:8080/api/");
        assert_eq!(client.url("/posts"), "http://localhost:8080/api/posts");
    }

    #[test]
    fn post_paths_embed_the_id() {
        let client = QuillClient::new("http://localhost:8080/api");
        let id = Uuid::nil();
        assert_eq!(
            client.url(&format!("/posts/{id}")),
            "http://localhost:8080/api/posts/00000000-0000-0000-0000-000000000000"
        );
    }
}
