//! Book API Module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/books | GET | none |
//! | /api/books/{id} | GET | none |
//! | /api/books/create | POST | admin |
//! | /api/books/upload/image | POST | admin |
//! | /api/books/edit/{id} | PUT | admin |
//! | /api/books/{id} | DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/books", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/create", post(handler::create))
        .route("/upload/image", post(handler::upload_cover))
        .route("/edit/{id}", put(handler::update))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
