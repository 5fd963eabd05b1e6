//! Review API Module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/reviews | POST | token |
//! | /api/reviews/book/{bookId} | GET | none |
//! | /api/reviews/{id} | PUT, DELETE | author or admin |
//! | /api/reviews/all | GET | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reviews", routes())
}

fn routes() -> Router<ServerState> {
    // Ownership is checked per review in the service
    let user_routes = Router::new()
        .route("/", post(handler::create))
        .route("/book/{book_id}", get(handler::list_for_book))
        .route("/{id}", put(handler::update).delete(handler::delete));

    let manage_routes = Router::new()
        .route("/all", get(handler::list_all))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(manage_routes)
}
