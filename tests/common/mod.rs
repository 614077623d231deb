#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use desemprego_zero::app::{app, AppState};
use desemprego_zero::auth::TokenIssuer;
use desemprego_zero::database::MemoryStore;
use desemprego_zero::services::provision_admin;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@igreja.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// The full router over an in-memory store, with one provisioned admin.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<TokenIssuer>,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_cors(CorsLayer::permissive()).await
    }

    pub async fn spawn_with_cors(cors: CorsLayer) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        provision_admin(store.as_ref(), ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .context("failed to provision test admin")?;

        let tokens = Arc::new(TokenIssuer::new(
            "integration-test-secret",
            "desemprego-zero",
            Duration::hours(24),
        )?);
        let state = AppState::new(store.clone(), tokens.clone())?;

        Ok(Self {
            router: app(state, cors),
            store,
            tokens,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };

        Ok((status, value))
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn login(&self) -> Result<String> {
        let (status, body) = self
            .post(
                "/admin/login",
                None,
                json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);

        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carries no token")
    }

    pub async fn create_job(&self, token: &str, title: &str) -> Result<i64> {
        let (status, body) = self.post("/jobs", Some(token), job_body(title)).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed: {} {}", status, body);
        body["data"]["id"].as_i64().context("created job has no id")
    }
}

pub fn job_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Coordinate volunteers for the community kitchen",
        "company": "Igreja Central",
        "location": "São Paulo",
        "salary": "R$ 3.000",
        "type": "Full-time",
        "requirements": "Good communication and two years of experience",
        "deadline": (Utc::now() + Duration::days(30)).to_rfc3339()
    })
}

pub fn application_body(email: &str, job_id: i64) -> Value {
    json!({
        "name": "Maria Oliveira",
        "email": email,
        "phone": "(11) 98765-4321",
        "resume": "Administrative assistant for eight years",
        "experience": "Scheduling, purchasing and reception",
        "education": "Business administration degree",
        "job_id": job_id
    })
}
