//! Utility module
//!
//! - [`AppError`] / [`AppResult`] re-exported from `shared::error`
//! - [`logger`]: tracing subscriber setup
//! - [`validation`]: text limits and DTO validation helpers
//! - [`time`]: Unix-millis helpers

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
