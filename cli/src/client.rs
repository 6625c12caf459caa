//! Minimal typed client for the Potluck HTTP API.

use anyhow::{bail, Context, Result};
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub average_rating: f64,
    pub total_ratings: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;
        parse(response, what).await
    }

    pub async fn unauthed_ping(&self) -> Result<PingResponse> {
        self.send(self.request(reqwest::Method::GET, "/api/test/unauthed-ping"), "ping")
            .await
    }

    pub async fn signup(&self, request: &SignupRequest<'_>) -> Result<SignupResponse> {
        self.send(
            self.request(reqwest::Method::POST, "/api/auth/signup").json(request),
            "signup",
        )
        .await
    }

    /// Returns `None` when the server rejects the credentials.
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<Option<LoginResponse>> {
        let response = self
            .request(reqwest::Method::POST, "/api/auth/login")
            .json(request)
            .send()
            .await
            .context("Failed to send login request")?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        parse(response, "login").await.map(Some)
    }

    pub async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        self.send(self.request(reqwest::Method::GET, "/api/recipes"), "list recipes")
            .await
    }

    pub async fn create_recipe(&self, form: Form) -> Result<Recipe> {
        self.send(
            self.request(reqwest::Method::POST, "/api/recipes").multipart(form),
            "create recipe",
        )
        .await
    }

    pub async fn rate_recipe(&self, id: &str, rating: u8) -> Result<Recipe> {
        self.send(
            self.request(reqwest::Method::POST, &format!("/api/recipes/{}/rate", id))
                .json(&serde_json::json!({ "rating": rating })),
            "rate recipe",
        )
        .await
    }
}

async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        bail!("{} failed with {}: {}", what, status, message);
    }

    response
        .json()
        .await
        .with_context(|| format!("Invalid {} response", what))
}
