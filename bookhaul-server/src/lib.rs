//! BookHaul Server - bookstore e-commerce backend
//!
//! # Overview
//!
//! REST API for the storefront and the admin dashboard:
//!
//! - **Catalog** (`api::books`): book CRUD, cover upload
//! - **Orders** (`orders`): checkout with stock reservation, order and
//!   payment state machine, online payment verification
//! - **Reviews** (`services::reviews`): verified-purchase reviews, rating
//!   aggregates
//! - **Chat** (`services::chat`): buyer-seller threads per product
//! - **Accounts** (`api::auth`): JWT + Argon2
//! - **Database** (`db`): embedded SurrealDB
//!
//! # Module layout
//!
//! ```text
//! bookhaul-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # JWT, middleware, extractor
//! ├── db/            # models, repositories, schema
//! ├── orders/        # order lifecycle
//! ├── services/      # reviews, chat, stats, images, HTTP(S)
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ErrorBody, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and start logging
///
/// Logs go to `WORK_DIR/logs` when that directory exists, stdout otherwise.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
    let log_dir = std::path::PathBuf::from(&work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let level = std::env::var("LOG_LEVEL").ok();
    let json = std::env::var("LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or(false);
    init_logger_with_file(level.as_deref(), json, Some(&log_dir));

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____              __   __  __            __
   / __ )____  ____  / /__/ / / /___ ___  __/ /
  / __  / __ \/ __ \/ //_/ /_/ / __ `/ / / / /
 / /_/ / /_/ / /_/ / ,< / __  / /_/ / /_/ / /
/_____/\____/\____/_/|_/_/ /_/\__,_/\__,_/_/
    "#
    );
}
