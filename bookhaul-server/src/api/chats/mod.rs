//! Chat API Module
//!
//! All routes need a token; the service checks that the caller takes part
//! in the thread.
//!
//! | Path | Method |
//! |------|--------|
//! | /api/chats | GET |
//! | /api/chats/{chatId} | GET |
//! | /api/chats/product/{productId} | POST |
//! | /api/chats/{chatId}/messages | POST |
//! | /api/chats/{chatId}/read | PATCH |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/chats", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{chat_id}", get(handler::get_by_id))
        .route("/product/{product_id}", post(handler::create_or_get))
        .route("/{chat_id}/messages", post(handler::send_message))
        .route("/{chat_id}/read", patch(handler::mark_read))
}
