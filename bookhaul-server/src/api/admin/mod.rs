//! Admin dashboard routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/admin/stats | GET | admin |

use axum::{Json, Router, extract::State, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;
use crate::services::AdminStats;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .layer(middleware::from_fn(require_admin))
}

/// Order, sales and catalog totals with a 12-month sales rollup
async fn stats(State(state): State<ServerState>) -> AppResult<Json<AdminStats>> {
    let stats = state.stats.admin_stats().await?;
    tracing::debug!(
        total_orders = stats.total_orders,
        total_books = stats.total_books,
        "Admin stats computed"
    );
    Ok(Json(stats))
}
