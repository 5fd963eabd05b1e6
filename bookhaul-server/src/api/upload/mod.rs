//! Upload Routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/uploads/image | POST | token |
//! | /api/images/{file} | GET | none |

mod handler;

pub(crate) use handler::{ImageInput, UploadResponse, read_image_field};

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        // Review and chat images, any signed-in user
        .route("/api/uploads/image", post(handler::upload))
        // Stored images, public
        .route("/api/images/{file}", get(handler::serve_image))
}
