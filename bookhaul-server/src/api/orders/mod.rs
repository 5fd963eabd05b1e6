//! Order API Module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | POST | none |
//! | /api/orders/email/{email} | GET | none |
//! | /api/orders/verify-payment | POST | none |
//! | /api/orders/all | GET | admin |
//! | /api/orders/{id} | GET | admin |
//! | /api/orders/status/{id} | PUT | admin |
//! | /api/orders/payment-status/{id} | PUT | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // Checkout and order tracking are open to guests
    let public_routes = Router::new()
        .route("/", post(handler::create))
        .route("/email/{email}", get(handler::list_by_email))
        .route("/verify-payment", post(handler::verify_payment));

    let manage_routes = Router::new()
        .route("/all", get(handler::list_all))
        .route("/{id}", get(handler::get_by_id))
        .route("/status/{id}", put(handler::update_status))
        .route("/payment-status/{id}", put(handler::update_payment_status))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(manage_routes)
}
