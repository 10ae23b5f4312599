#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use stay_finder_api::config::AppConfig;
use stay_finder_api::database::MemoryStore;
use stay_finder_api::{app, AppState};

pub const BOUNDARY: &str = "----stayfinderboundary";

/// In-process app backed by the memory store and a throwaway upload dir
pub struct TestApp {
    pub router: Router,
    pub config: AppConfig,
    pub uploads: TempDir,
}

pub fn test_app() -> TestApp {
    test_app_with(|_| {})
}

/// Same as [`test_app`] with a chance to adjust the config first
pub fn test_app_with(adjust: impl FnOnce(&mut AppConfig)) -> TestApp {
    let uploads = tempfile::tempdir().expect("tempdir");
    let mut config = AppConfig::development();
    adjust(&mut config);
    config.uploads.dir = uploads.path().to_path_buf();

    let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());
    TestApp {
        router: app(state),
        config,
        uploads,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let res = self.router.clone().oneshot(request).await?;
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse { status, body })
    }

    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string()))?).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.bare(Method::GET, uri, token).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.bare(Method::DELETE, uri, token).await
    }

    async fn bare(&self, method: Method, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty())?).await
    }

    pub async fn create_listing(&self, token: &str, form: &MultipartForm) -> Result<TestResponse> {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/listings")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(form.to_bytes()))?;
        self.send(request).await
    }

    /// Sign up and return the issued token
    pub async fn signup(&self, email: &str, password: &str, role: &str) -> Result<String> {
        let res = self
            .json(
                Method::POST,
                "/api/auth/signup",
                None,
                json!({ "email": email, "password": password, "role": role }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "signup failed: {} {}", res.status, res.body);
        Ok(res.body["token"].as_str().unwrap_or_default().to_string())
    }
}

/// Hand-built multipart/form-data body
#[derive(Default, Clone)]
pub struct MultipartForm {
    parts: Vec<(String, Option<String>, Vec<u8>)>,
}

impl MultipartForm {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push((name.to_string(), None, value.as_bytes().to_vec()));
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.parts.push((name.to_string(), Some(file_name.to_string()), bytes.to_vec()));
        self
    }

    /// Drop every part with the given name
    pub fn without(mut self, name: &str) -> Self {
        self.parts.retain(|(n, _, _)| n != name);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, file_name, bytes) in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(f) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, f
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            out.extend_from_slice(bytes);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        out
    }
}

/// A complete listing form without images
pub fn listing_form(title: &str) -> MultipartForm {
    MultipartForm::default()
        .text("title", title)
        .text("location", r#"{"lat":12.97,"lng":77.64}"#)
        .text("locationString", "Indiranagar, Bangalore")
        .text("rent", "5000")
        .text("facilities", r#"["wifi","parking"]"#)
        .text("amenities", r#"["gym"]"#)
        .text("type", "Room")
        .text("description", "Bright room near the metro")
        .text("availableFrom", "2025-07-01")
        .text("events", "No")
        .text("leaseTerm", "11")
        .text("ownerContact", r#"{"name":"Owner One","phone":"9999999999","email":"owner1@example.com"}"#)
}
