//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness
//! - [`auth`] - register, login, profile, user administration
//! - [`books`] - catalog
//! - [`orders`] - checkout, status changes, payment verification
//! - [`reviews`] - book reviews
//! - [`chats`] - buyer-seller threads
//! - [`admin`] - dashboard statistics
//! - [`upload`] - image upload and download

pub mod extract;

pub mod admin;
pub mod auth;
pub mod books;
pub mod chats;
pub mod health;
pub mod orders;
pub mod reviews;
pub mod upload;

pub use extract::ValidJson;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
