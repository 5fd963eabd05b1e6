//! Chat Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CHAT_TABLE, Chat, ChatMessage};

#[derive(Clone)]
pub struct ChatRepository {
    base: BaseRepository,
}

impl ChatRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Chat>> {
        let chat: Option<Chat> = self.base.db().select(id.clone()).await?;
        Ok(chat)
    }

    pub async fn find_by_triple(
        &self,
        product: &str,
        buyer: &str,
        seller: &str,
    ) -> RepoResult<Option<Chat>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM chat WHERE product = $product AND buyer = $buyer AND seller = $seller LIMIT 1",
            )
            .bind(("product", product.to_string()))
            .bind(("buyer", buyer.to_string()))
            .bind(("seller", seller.to_string()))
            .await?;
        let chats: Vec<Chat> = result.take(0)?;
        Ok(chats.into_iter().next())
    }

    /// Insert a thread; a concurrent insert of the same triple yields `Duplicate`
    pub async fn create(&self, chat: Chat) -> RepoResult<Chat> {
        let created: Option<Chat> = self.base.db().create(CHAT_TABLE).content(chat).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create chat".to_string()))
    }

    /// Threads where `user_id` is buyer or seller, most recent activity first
    pub async fn find_for_user(&self, user_id: &str) -> RepoResult<Vec<Chat>> {
        let chats: Vec<Chat> = self
            .base
            .db()
            .query(
                "SELECT * FROM chat WHERE buyer = $user OR seller = $user ORDER BY lastMessage DESC",
            )
            .bind(("user", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(chats)
    }

    /// Append one message and advance `lastMessage` in a single statement
    pub async fn append_message(&self, id: &RecordId, message: ChatMessage) -> RepoResult<Chat> {
        let timestamp = message.timestamp;
        let updated: Vec<Chat> = self
            .base
            .db()
            .query("UPDATE $id SET messages += $message, lastMessage = $ts RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("message", message))
            .bind(("ts", timestamp))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Chat {} not found", id)))
    }

    /// Replace the message list if its read flags still equal `expected`
    ///
    /// `expected` is the `isRead` flag of every message as loaded, in order.
    /// An append changes its length and a concurrent mark-read changes its
    /// values; either way nothing is written and `false` is returned.
    pub async fn replace_messages_if_unchanged(
        &self,
        id: &RecordId,
        expected: Vec<bool>,
        messages: Vec<ChatMessage>,
    ) -> RepoResult<bool> {
        let result = self
            .base
            .db()
            .query("UPDATE $id SET messages = $messages WHERE messages.isRead = $expected RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("messages", messages))
            .bind(("expected", expected))
            .await;

        match result.and_then(|mut r| r.take::<Vec<Chat>>(0)) {
            Ok(updated) => Ok(!updated.is_empty()),
            Err(e) => match RepoError::from(e) {
                RepoError::Conflict(msg) => {
                    tracing::debug!(chat_id = %id, error = %msg, "Mark-read write conflicted");
                    Ok(false)
                }
                other => Err(other),
            },
        }
    }
}
