//! Data models
//!
//! Stored documents use camelCase field names, the same shape the API
//! returns. Cross-document references are "table:key" strings.

pub mod book;
pub mod chat;
pub mod order;
pub mod review;
pub mod serde_helpers;
pub mod user;

pub use book::{Book, BookPatch, ImageRef};
pub use chat::{Chat, ChatMessage};
pub use order::{Address, Order, OrderItem, PaymentDetails};
pub use review::Review;
pub use user::{NewUser, ProfilePatch, ShippingAddress, User};

/// Table names
pub const BOOK_TABLE: &str = "book";
pub const ORDER_TABLE: &str = "book_order";
pub const REVIEW_TABLE: &str = "review";
pub const CHAT_TABLE: &str = "chat";
pub const USER_TABLE: &str = "app_user";
