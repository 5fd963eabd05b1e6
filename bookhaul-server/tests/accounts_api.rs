//! Accounts, catalog administration and dashboard stats over HTTP

mod common;

use common::{ADMIN_PASSWORD, TestApp, error_code};
use http::{Method, StatusCode};
use serde_json::json;

const EMAIL_EXISTS: u64 = 8002;
const USERNAME_EXISTS: u64 = 8003;
const CANNOT_MODIFY_SELF: u64 = 2004;
const INVALID_CATEGORY: u64 = 3002;

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let resp = app.get("/api/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "ok");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::spawn().await;
    let (token, id) = app.register("reader", "reader@example.com").await;

    let verify = app.get("/api/auth/verify", Some(&token)).await;
    assert_eq!(verify.status, StatusCode::OK);
    assert_eq!(verify.body["id"], id.as_str());
    assert_eq!(verify.body["role"], "user");
    assert!(verify.body.get("passwordHash").is_none());

    let login = app
        .post(
            "/api/auth/login",
            None,
            json!({"email": "reader@example.com", "password": "secret123"}),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.body["token"].is_string());

    let wrong = app
        .post(
            "/api/auth/login",
            None,
            json!({"email": "reader@example.com", "password": "nope-nope"}),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = TestApp::spawn().await;
    app.register("reader", "reader@example.com").await;

    let same_email = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "reader@example.com", "password": "secret123", "userName": "other"}),
        )
        .await;
    assert_eq!(same_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&same_email), EMAIL_EXISTS);

    let same_name = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "other@example.com", "password": "secret123", "userName": "reader"}),
        )
        .await;
    assert_eq!(error_code(&same_name), USERNAME_EXISTS);

    let short_password = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "x@example.com", "password": "123", "userName": "xavier"}),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_never_grants_admin() {
    let app = TestApp::spawn().await;
    let resp = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "email": "sneaky@example.com",
                "password": "secret123",
                "userName": "sneaky",
                "role": "admin"
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["user"]["role"], "user");

    let admin_login = app
        .post(
            "/api/auth/admin",
            None,
            json!({"userName": "sneaky", "password": "secret123"}),
        )
        .await;
    assert_eq!(admin_login.status, StatusCode::UNAUTHORIZED);
    assert_eq!(admin_login.body["message"], "Invalid admin credentials");
}

#[tokio::test]
async fn test_profile_update_merges_address() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("reader", "reader@example.com").await;

    let first = app
        .put(
            "/api/auth/profile",
            Some(&token),
            json!({"firstName": "Sita", "shippingAddress": {"city": "Kathmandu", "country": "Nepal"}}),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);

    let second = app
        .put(
            "/api/auth/profile",
            Some(&token),
            json!({"shippingAddress": {"city": "Pokhara"}}),
        )
        .await;
    assert_eq!(second.body["firstName"], "Sita");
    assert_eq!(second.body["shippingAddress"]["city"], "Pokhara");
    assert_eq!(second.body["shippingAddress"]["country"], "Nepal");
}

#[tokio::test]
async fn test_user_administration() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, reader_id) = app.register("reader", "reader@example.com").await;

    let users = app.get("/api/auth/users", Some(&admin)).await;
    assert_eq!(users.body.as_array().unwrap().len(), 2);

    let promoted = app
        .request(
            Method::PATCH,
            &format!("/api/auth/users/{}/role", reader_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK, "{}", promoted.body);
    assert_eq!(promoted.body["role"], "admin");

    let me = app.get("/api/auth/verify", Some(&admin)).await;
    let my_id = me.body["id"].as_str().unwrap().to_string();
    let delete_self = app
        .request(
            Method::DELETE,
            &format!("/api/auth/users/{}", my_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(delete_self.status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&delete_self), CANNOT_MODIFY_SELF);

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/api/auth/users/{}", reader_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let gone = app.get(&format!("/api/auth/users/{}", reader_id), Some(&admin)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_administration() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (customer, _) = app.register("reader", "reader@example.com").await;

    let body = json!({
        "title": "Muna Madan",
        "author": "Laxmi Prasad Devkota",
        "category": "Nepali Literature",
        "price": "250",
        "quantity": "4",
        "coverImage": {"url": "http://localhost:5000/api/images/muna.jpg"}
    });
    let forbidden = app.post("/api/books/create", Some(&customer), body.clone()).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let created = app.post("/api/books/create", Some(&admin), body).await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.body);
    let book = &created.body["book"];
    assert_eq!(book["price"], json!(250.0));
    assert_eq!(book["quantity"], 4);
    assert_eq!(book["coverImage"]["publicId"], "muna");
    let id = book["id"].as_str().unwrap().to_string();

    let bad_category = app
        .put(
            &format!("/api/books/edit/{}", id),
            Some(&admin),
            json!({"category": "Cooking"}),
        )
        .await;
    assert_eq!(error_code(&bad_category), INVALID_CATEGORY);

    let sold_out = app
        .put(
            &format!("/api/books/edit/{}", id),
            Some(&admin),
            json!({"quantity": 0}),
        )
        .await;
    assert_eq!(sold_out.status, StatusCode::OK);
    assert_eq!(sold_out.body["book"]["quantity"], 0);
    assert_eq!(sold_out.body["book"]["title"], "Muna Madan");

    let missing_fields = app
        .post("/api/books/create", Some(&admin), json!({"title": "Untitled"}))
        .await;
    assert_eq!(missing_fields.status, StatusCode::BAD_REQUEST);

    let list = app.get("/api/books", None).await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);

    let deleted = app
        .request(Method::DELETE, &format!("/api/books/{}", id), Some(&admin), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let gone = app.get(&format!("/api/books/{}", id), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_stats() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 10).await;
    app.create_book(&admin, "Emma", 5.0, 10).await;
    app.put(
        &format!("/api/books/edit/{}", dune),
        Some(&admin),
        json!({"trending": "true"}),
    )
    .await;

    app.place_order("a@example.com", "COD", &[(dune.as_str(), 2)]).await;
    app.place_order("b@example.com", "COD", &[(dune.as_str(), 1)]).await;

    let stats = app.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(stats.status, StatusCode::OK, "{}", stats.body);
    assert_eq!(stats.body["totalOrders"], 2);
    assert_eq!(stats.body["totalSales"], json!(30.0));
    assert_eq!(stats.body["totalBooks"], 2);
    assert_eq!(stats.body["trendingBooks"], 1);

    let monthly = stats.body["monthlySales"].as_array().unwrap();
    assert_eq!(monthly.len(), 12);
    let orders_in_months: i64 = monthly
        .iter()
        .map(|m| m["totalOrders"].as_i64().unwrap())
        .sum();
    assert_eq!(orders_in_months, 2);

    let (customer, _) = app.register("reader", "reader@example.com").await;
    let forbidden = app.get("/api/admin/stats", Some(&customer)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_login_uses_bootstrap_account() {
    let app = TestApp::spawn().await;
    let wrong = app
        .post(
            "/api/auth/admin",
            None,
            json!({"userName": common::ADMIN_USERNAME, "password": format!("{}x", ADMIN_PASSWORD)}),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert!(!app.admin_token().await.is_empty());
}
