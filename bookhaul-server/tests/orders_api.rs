//! Checkout and order lifecycle over HTTP

mod common;

use common::{TestApp, error_code};
use futures::future::join_all;
use http::StatusCode;
use serde_json::json;

const OUT_OF_STOCK: u64 = 3004;
const ORDER_TERMINAL: u64 = 4002;
const PAYMENT_PENDING: u64 = 4007;
const ORDER_NOT_PAID: u64 = 4003;

#[tokio::test]
async fn test_total_is_computed_server_side() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.10, 10).await;
    let emma = app.create_book(&admin, "Emma", 5.25, 10).await;

    let mut body = common::order_body(
        "buyer@example.com",
        "COD",
        vec![
            json!({"productId": dune, "quantity": 3}),
            json!({"productId": emma, "quantity": 2}),
        ],
    );
    body["totalPrice"] = json!(1.0);
    let resp = app.post("/api/orders", None, body).await;

    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(resp.body["totalPrice"], json!(40.8));
    assert_eq!(resp.body["orderStatus"], "Pending");
    assert_eq!(resp.body["paymentStatus"], "Pending");
    assert_eq!(resp.body["items"][0]["title"], "Dune");

    let book = app.book(&dune).await;
    assert_eq!(book["quantity"], 7);
    assert_eq!(book["sold"], 3);
}

#[tokio::test]
async fn test_failed_order_leaves_stock_untouched() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 5).await;
    let emma = app.create_book(&admin, "Emma", 8.0, 1).await;

    let resp = app
        .place_order(
            "buyer@example.com",
            "COD",
            &[(dune.as_str(), 2), (emma.as_str(), 4), ("book:missing", 1)],
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&resp), OUT_OF_STOCK);
    let report = resp.body["details"]["outOfStock"].as_array().unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0]["title"], "Emma");
    assert_eq!(report[0]["reason"], "Insufficient stock");
    assert_eq!(report[1]["title"], "Unknown Product");
    assert_eq!(report[1]["reason"], "Not found");

    assert_eq!(app.book(&dune).await["quantity"], 5);
    assert_eq!(app.book(&emma).await["quantity"], 1);

    let orders = app.get("/api/orders/all", Some(&admin)).await;
    assert_eq!(orders.body, json!([]));
}

#[tokio::test]
async fn test_duplicate_lines_are_merged_before_the_stock_check() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 3).await;

    let resp = app
        .place_order("buyer@example.com", "COD", &[(dune.as_str(), 2), (dune.as_str(), 2)])
        .await;
    assert_eq!(error_code(&resp), OUT_OF_STOCK);
    assert_eq!(app.book(&dune).await["quantity"], 3);
}

#[tokio::test]
async fn test_concurrent_orders_never_oversell() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 5).await;

    let app_ref = &app;
    let attempts = (0..2).map(|i| {
        let email = format!("buyer{}@example.com", i);
        let dune = dune.clone();
        async move { app_ref.place_order(&email, "COD", &[(dune.as_str(), 3)]).await }
    });
    let results = join_all(attempts).await;

    let succeeded = results
        .iter()
        .filter(|r| r.status == StatusCode::OK)
        .count() as i64;
    assert!(succeeded <= 1, "both orders were accepted");
    for failed in results.iter().filter(|r| r.status != StatusCode::OK) {
        assert_eq!(error_code(failed), OUT_OF_STOCK, "{}", failed.body);
    }

    let book = app.book(&dune).await;
    assert_eq!(book["quantity"], 5 - 3 * succeeded);
    assert!(book["quantity"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_cod_delivery_requires_completed_payment() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 5).await;
    let order = app.place_order("buyer@example.com", "COD", &[(dune.as_str(), 1)]).await;
    let id = order.body["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/orders/status/{}", id);

    let shipped = app
        .put(&status_uri, Some(&admin), json!({"orderStatus": "Shipped"}))
        .await;
    assert_eq!(shipped.status, StatusCode::OK, "{}", shipped.body);

    let delivered = app
        .put(&status_uri, Some(&admin), json!({"orderStatus": "Delivered"}))
        .await;
    assert_eq!(delivered.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&delivered), PAYMENT_PENDING);

    let current = app.get(&format!("/api/orders/{}", id), Some(&admin)).await;
    assert_eq!(current.body["orderStatus"], "Shipped");
    assert_eq!(current.body["paymentStatus"], "Pending");

    let paid = app
        .put(
            &format!("/api/orders/payment-status/{}", id),
            Some(&admin),
            json!({"paymentStatus": "Completed"}),
        )
        .await;
    assert_eq!(paid.status, StatusCode::OK, "{}", paid.body);

    let delivered = app
        .put(&status_uri, Some(&admin), json!({"orderStatus": "Delivered"}))
        .await;
    assert_eq!(delivered.status, StatusCode::OK, "{}", delivered.body);
    assert_eq!(delivered.body["order"]["orderStatus"], "Delivered");
    assert_eq!(delivered.body["order"]["paymentStatus"], "Completed");
}

#[tokio::test]
async fn test_terminal_orders_are_immutable() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 5).await;
    let order = app.place_order("buyer@example.com", "COD", &[(dune.as_str(), 1)]).await;
    let id = order.body["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/orders/status/{}", id);

    let cancelled = app
        .put(&status_uri, Some(&admin), json!({"orderStatus": "Cancelled"}))
        .await;
    assert_eq!(cancelled.status, StatusCode::OK, "{}", cancelled.body);

    for target in ["Pending", "Processing", "Shipped", "Delivered", "Cancelled"] {
        let resp = app
            .put(&status_uri, Some(&admin), json!({"orderStatus": target}))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{}", target);
        assert_eq!(error_code(&resp), ORDER_TERMINAL);
    }

    let payment = app
        .put(
            &format!("/api/orders/payment-status/{}", id),
            Some(&admin),
            json!({"paymentStatus": "Completed"}),
        )
        .await;
    assert_eq!(payment.status, StatusCode::BAD_REQUEST);

    let current = app.get(&format!("/api/orders/{}", id), Some(&admin)).await;
    assert_eq!(current.body["orderStatus"], "Cancelled");
    assert_eq!(current.body["paymentStatus"], "Pending");
}

#[tokio::test]
async fn test_concurrent_status_updates_cannot_reopen_a_final_order() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 5).await;
    let order = app.place_order("buyer@example.com", "COD", &[(dune.as_str(), 1)]).await;
    let id = order.body["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/orders/status/{}", id);

    let shipped = app
        .put(&status_uri, Some(&admin), json!({"orderStatus": "Shipped"}))
        .await;
    assert_eq!(shipped.status, StatusCode::OK, "{}", shipped.body);
    let paid = app
        .put(
            &format!("/api/orders/payment-status/{}", id),
            Some(&admin),
            json!({"paymentStatus": "Completed"}),
        )
        .await;
    assert_eq!(paid.status, StatusCode::OK, "{}", paid.body);

    // Both targets are valid from Shipped/Completed; only one may land
    let (app_ref, admin_ref, uri_ref) = (&app, &admin, &status_uri);
    let attempts = ["Cancelled", "Delivered"].into_iter().map(|target| async move {
        let resp = app_ref
            .put(uri_ref, Some(admin_ref), json!({"orderStatus": target}))
            .await;
        (target, resp)
    });
    let results = join_all(attempts).await;

    let winners: Vec<&str> = results
        .iter()
        .filter(|(_, r)| r.status == StatusCode::OK)
        .map(|(target, _)| *target)
        .collect();
    assert_eq!(winners.len(), 1, "{:?}", winners);
    for (_, lost) in results.iter().filter(|(_, r)| r.status != StatusCode::OK) {
        assert_eq!(lost.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(lost), ORDER_TERMINAL, "{}", lost.body);
    }

    let current = app.get(&format!("/api/orders/{}", id), Some(&admin)).await;
    assert_eq!(current.body["orderStatus"], winners[0]);
}

#[tokio::test]
async fn test_online_order_must_be_paid_before_fulfilment() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 12.5, 5).await;
    let order = app.place_order("buyer@example.com", "eSewa", &[(dune.as_str(), 2)]).await;
    let id = order.body["id"].as_str().unwrap().to_string();

    let resp = app
        .put(
            &format!("/api/orders/status/{}", id),
            Some(&admin),
            json!({"orderStatus": "Processing"}),
        )
        .await;
    assert_eq!(error_code(&resp), ORDER_NOT_PAID);

    let mismatch = app
        .post(
            "/api/orders/verify-payment",
            None,
            json!({"orderId": id, "transactionId": "tx-1", "amount": 20}),
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);

    let verified = app
        .post(
            "/api/orders/verify-payment",
            None,
            json!({"orderId": id, "transactionId": "tx-1", "amount": "25.00"}),
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK, "{}", verified.body);
    assert_eq!(verified.body["order"]["paymentStatus"], "Completed");
    assert_eq!(verified.body["order"]["orderStatus"], "Processing");
    assert_eq!(verified.body["order"]["paymentDetails"]["transactionId"], "tx-1");

    let again = app
        .post(
            "/api/orders/verify-payment",
            None,
            json!({"orderId": id, "transactionId": "tx-2", "amount": 25}),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_orders_by_email() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let dune = app.create_book(&admin, "Dune", 10.0, 5).await;

    let none = app.get("/api/orders/email/nobody@example.com", None).await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    app.place_order("reader@example.com", "COD", &[(dune.as_str(), 1)]).await;
    app.place_order("reader@example.com", "COD", &[(dune.as_str(), 1)]).await;
    let found = app.get("/api/orders/email/reader@example.com", None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_order_administration_requires_admin() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("reader", "reader@example.com").await;

    let anonymous = app.get("/api/orders/all", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let customer = app.get("/api/orders/all", Some(&token)).await;
    assert_eq!(customer.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_order_body_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .post(
            "/api/orders",
            None,
            common::order_body("not-an-email", "COD", vec![]),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post(
            "/api/orders",
            None,
            common::order_body("a@example.com", "Cheque", vec![json!({"productId": "x", "quantity": 1})]),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
