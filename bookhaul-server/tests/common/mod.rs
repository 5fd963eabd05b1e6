//! Shared setup for the HTTP integration tests
//!
//! Each [`TestApp`] owns a fresh RocksDB directory and drives the full
//! router in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use bookhaul_server::core::config::AdminBootstrap;
use bookhaul_server::db::DbService;
use bookhaul_server::orders::{EsewaGateway, PaymentGateways};
use bookhaul_server::services::https::build_router;
use bookhaul_server::{Config, ServerState};
use http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@bookhaul.test";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    _dir: TempDir,
}

/// Status code and parsed JSON body (`Null` for an empty body)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::for_work_dir(dir.path().to_string_lossy().to_string());
        config.admin = Some(AdminBootstrap {
            email: ADMIN_EMAIL.into(),
            user_name: ADMIN_USERNAME.into(),
            password: ADMIN_PASSWORD.into(),
        });
        config.ensure_work_dir_structure().expect("work dir");

        let db = DbService::new(&config.database_dir()).await.expect("database");
        let gateways = PaymentGateways::default().with(Arc::new(EsewaGateway));
        let state = ServerState::build(config, db.db, gateways)
            .await
            .expect("server state");

        Self {
            router: build_router(state.clone()),
            state,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn admin_token(&self) -> String {
        let resp = self
            .post(
                "/api/auth/admin",
                None,
                json!({"userName": ADMIN_USERNAME, "password": ADMIN_PASSWORD}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "admin login: {}", resp.body);
        resp.body["token"].as_str().expect("token").to_string()
    }

    /// Register a customer; returns (token, user id)
    pub async fn register(&self, user_name: &str, email: &str) -> (String, String) {
        let resp = self
            .post(
                "/api/auth/register",
                None,
                json!({"email": email, "password": "secret123", "userName": user_name}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "register: {}", resp.body);
        (
            resp.body["token"].as_str().expect("token").to_string(),
            resp.body["user"]["id"].as_str().expect("id").to_string(),
        )
    }

    /// Create a book as admin; returns its id
    pub async fn create_book(&self, admin: &str, title: &str, price: f64, quantity: i64) -> String {
        let resp = self
            .post(
                "/api/books/create",
                Some(admin),
                json!({
                    "title": title,
                    "author": "Test Author",
                    "category": "Classics",
                    "price": price,
                    "quantity": quantity,
                    "coverImage": {"url": format!("http://localhost:5000/api/images/{}.png", title)}
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create book: {}", resp.body);
        resp.body["book"]["id"].as_str().expect("book id").to_string()
    }

    pub async fn book(&self, id: &str) -> Value {
        let resp = self.get(&format!("/api/books/{}", id), None).await;
        assert_eq!(resp.status, StatusCode::OK, "get book: {}", resp.body);
        resp.body
    }

    /// Place an order; the raw response is returned for failure assertions
    pub async fn place_order(
        &self,
        email: &str,
        method: &str,
        items: &[(&str, i64)],
    ) -> TestResponse {
        let items: Vec<Value> = items
            .iter()
            .map(|(id, qty)| json!({"productId": id, "quantity": qty}))
            .collect();
        self.post("/api/orders", None, order_body(email, method, items)).await
    }
}

pub fn order_body(email: &str, method: &str, items: Vec<Value>) -> Value {
    json!({
        "name": "Test Buyer",
        "email": email,
        "phone": "9800000000",
        "address": {
            "city": "Kathmandu",
            "country": "Nepal",
            "state": "Bagmati",
            "zipcode": "44600"
        },
        "items": items,
        "paymentMethod": method
    })
}

/// Numeric error code in the error envelope
pub fn error_code(resp: &TestResponse) -> u64 {
    resp.body["code"].as_u64().unwrap_or_default()
}
