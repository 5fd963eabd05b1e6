//! Chat Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::{ImageRef, serde_helpers};

/// One message in a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    /// "app_user:key"
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub timestamp: i64,
    #[serde(default)]
    pub is_read: bool,
}

/// Buyer-seller thread about one product
///
/// Unique per (product, buyer, seller). Messages are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub product: String,
    pub buyer: String,
    pub seller: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Timestamp of the newest message (creation time for empty threads)
    pub last_message: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Chat {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.buyer == user_id || self.seller == user_id
    }

    /// Messages the given user has not read yet
    pub fn unread_for(&self, user_id: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender != user_id && !m.is_read)
            .count()
    }
}
