//! Service layer
//!
//! # Services
//!
//! - [`ReviewService`] - review CRUD and rating aggregation
//! - [`ChatService`] - buyer-seller threads
//! - [`StatsService`] - admin dashboard rollups
//! - [`BlobStore`] / [`LocalBlobStore`] - image storage
//! - [`HttpsService`] - HTTP(S) server
//! - [`bootstrap`] - admin account and chat seller at startup
//!
//! Orders live in [`crate::orders`].

pub mod blob_store;
pub mod bootstrap;
pub mod chat;
pub mod https;
pub mod reviews;
pub mod stats;

pub use blob_store::{BlobError, BlobStore, LocalBlobStore};
pub use chat::{ChatService, ChatView};
pub use https::HttpsService;
pub use reviews::{ReviewService, ReviewView};
pub use stats::{AdminStats, MonthlySales, StatsService};
