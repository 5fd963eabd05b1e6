//! Authentication Routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/auth/register | POST | none |
//! | /api/auth/login | POST | none |
//! | /api/auth/admin | POST | none |
//! | /api/auth/verify | GET | token |
//! | /api/auth/profile | GET, PUT | token |
//! | /api/auth/users | GET | admin |
//! | /api/auth/users/{id} | GET, DELETE | admin |
//! | /api/auth/users/{id}/role | PATCH | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    // Public, and token-only routes (require_auth runs at the top level)
    let account_routes = Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/admin", post(handler::admin_login))
        .route("/verify", get(handler::verify))
        .route("/profile", get(handler::profile).put(handler::update_profile));

    let manage_routes = Router::new()
        .route("/users", get(handler::list_users))
        .route(
            "/users/{id}",
            get(handler::get_user).delete(handler::delete_user),
        )
        .route("/users/{id}/role", patch(handler::toggle_role))
        .layer(middleware::from_fn(require_admin));

    account_routes.merge(manage_routes)
}
