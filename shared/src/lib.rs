//! Shared types for BookHaul
//!
//! Types used by the server and by any Rust client of its API:
//! error codes and the error body, order lifecycle enums and the
//! catalog category list.

pub mod catalog;
pub mod error;
pub mod status;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use catalog::{Category, UserRole};
pub use error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
pub use status::{OrderStatus, ParseEnumError, PaymentMethod, PaymentStatus};
