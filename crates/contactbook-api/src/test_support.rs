//! Router harness shared by the route tests

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use contactbook_auth::JwtManager;
use contactbook_db::Database;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::create_router;
use crate::state::AppState;

pub const PASSWORD: &str = "5W]L8t1m4@PcTTO";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        let state = AppState::new(db, Arc::new(JwtManager::new("router-test-key")));
        let router = create_router(state.clone(), None);
        Self { state, router }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, &body.to_string()).await
    }

    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::get(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn put(&self, uri: &str, body: Value, authorization: &str) -> (StatusCode, Value) {
        let request = Request::put(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, authorization)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str, body: Value, authorization: Option<&str>) -> StatusCode {
        let mut builder = Request::delete(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .0
    }

    /// Register a user with [`PASSWORD`], returning its id
    pub async fn register(&self, username: &str, email: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/users",
                serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": PASSWORD,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["user"]["id"].as_str().unwrap().to_string()
    }

    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/login",
                serde_json::json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }
}
