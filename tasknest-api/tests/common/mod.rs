//! Common test utilities for API tests
//!
//! Builds the full router over in-memory repositories, so the HTTP layer,
//! middleware and use-cases are exercised without PostgreSQL or Redis.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Duration;
use serde_json::Value;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::Config;
use tasknest_shared::repository::{InMemoryTaskRepository, InMemoryUserRepository};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Users that exist only as token subjects
pub const ALICE: i64 = 101;
pub const BOB: i64 = 202;

/// Test context containing the router and its backing stores
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
    pub tasks: InMemoryTaskRepository,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_vars(HashMap::from([
            ("DATABASE_URL".to_string(), "postgresql://unused/unused".to_string()),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
        ]))
        .expect("test configuration");

        let tasks = InMemoryTaskRepository::new();
        let state = AppState::new(
            config,
            Arc::new(tasks.clone()),
            Arc::new(InMemoryUserRepository::new()),
            None,
        );

        Self {
            app: build_router(state.clone()),
            state,
            tasks,
        }
    }

    /// A valid token for `user_id`
    pub fn token_for(&self, user_id: i64) -> String {
        self.state.tokens.issue(user_id).expect("token").token
    }

    /// A token that expired an hour ago
    pub fn expired_token_for(&self, user_id: i64) -> String {
        self.state
            .tokens
            .generate_token(user_id, Duration::hours(-1))
            .expect("token")
            .token
    }

    /// Sends a request and returns the status and JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Body>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }

        let request = builder
            .body(body.unwrap_or_else(Body::empty))
            .expect("request");
        let response = self.app.clone().oneshot(request).await.expect("response");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(Body::from(body.to_string())))
            .await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(Body::from(body.to_string())))
            .await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Creates a task through the API and returns its id
    pub async fn create_task(&self, token: &str, title: &str, done: bool) -> i64 {
        let (status, body) = self
            .post_json(
                "/tasks",
                Some(token),
                serde_json::json!({ "title": title, "done": done }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["id"].as_i64().expect("id")
    }
}
