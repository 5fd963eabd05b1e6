//! Review Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::{ImageRef, serde_helpers};

/// A customer's rating of a book
///
/// At most one per (book, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// "book:key"
    pub book: String,
    /// "app_user:key"
    pub user: String,
    /// 1-5
    pub rating: i64,
    pub comment: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub verified_purchase: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Review {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}
