//! Buyer-seller chat
//!
//! One thread per (product, buyer, seller). The seller is the account
//! resolved at startup; buyers only ever talk to that account.

use std::collections::HashMap;

use serde::Serialize;
use shared::{AppError, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::auth::CurrentUser;
use crate::db::models::{BOOK_TABLE, CHAT_TABLE, Chat, ChatMessage, ImageRef, USER_TABLE};
use crate::db::repository::{
    BookRepository, ChatRepository, RepoError, UserRepository, parse_id,
};
use crate::utils::AppResult;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NOTE_LEN, trimmed};

/// Compare-and-swap attempts for mark-read before giving up
const MARK_READ_ATTEMPTS: usize = 5;

/// Thread with display names for the chat list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    #[serde(flatten)]
    pub chat: Chat,
    pub product_title: Option<String>,
    pub buyer_name: Option<String>,
    pub seller_name: Option<String>,
    pub unread_count: usize,
}

fn chat_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::ChatNotFound, format!("Chat {} not found", id))
}

/// Content trimmed; a message needs text or an image
fn build_message(
    sender: &str,
    content: Option<&str>,
    image: Option<ImageRef>,
) -> AppResult<ChatMessage> {
    let content = trimmed(content);
    if content.is_none() && image.is_none() {
        return Err(AppError::new(ErrorCode::EmptyMessage));
    }
    if content.as_ref().is_some_and(|c| c.len() > MAX_NOTE_LEN) {
        return Err(AppError::validation(format!(
            "Message is too long (max {} characters)",
            MAX_NOTE_LEN
        )));
    }
    Ok(ChatMessage {
        id: uuid::Uuid::new_v4().to_string(),
        sender: sender.to_string(),
        content,
        image,
        timestamp: now_millis(),
        is_read: false,
    })
}

/// Messages with every one not sent by `reader` marked read
///
/// `None` when nothing changes.
fn mark_read_for(messages: &[ChatMessage], reader: &str) -> Option<Vec<ChatMessage>> {
    let mut changed = false;
    let updated = messages
        .iter()
        .map(|m| {
            let mut m = m.clone();
            if m.sender != reader && !m.is_read {
                m.is_read = true;
                changed = true;
            }
            m
        })
        .collect();
    changed.then_some(updated)
}

#[derive(Clone)]
pub struct ChatService {
    chats: ChatRepository,
    books: BookRepository,
    users: UserRepository,
    seller_id: Option<String>,
}

impl ChatService {
    pub fn new(db: Surreal<Db>, seller_id: Option<String>) -> Self {
        Self {
            chats: ChatRepository::new(db.clone()),
            books: BookRepository::new(db.clone()),
            users: UserRepository::new(db),
            seller_id,
        }
    }

    pub fn seller_id(&self) -> Option<&str> {
        self.seller_id.as_deref()
    }

    /// Existing thread for (product, caller, seller), or a new one
    pub async fn create_or_get(&self, product_id: &str, buyer: &CurrentUser) -> AppResult<Chat> {
        let seller = self
            .seller_id
            .clone()
            .ok_or_else(|| AppError::new(ErrorCode::SellerNotConfigured))?;

        let product_record = parse_id(BOOK_TABLE, product_id)?;
        if self.books.find_by_id(&product_record).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::BookNotFound,
                format!("Book {} not found", product_id),
            ));
        }
        let product = product_record.to_string();

        if let Some(chat) = self.chats.find_by_triple(&product, &buyer.id, &seller).await? {
            return Ok(chat);
        }

        let now = now_millis();
        let chat = Chat {
            id: None,
            product: product.clone(),
            buyer: buyer.id.clone(),
            seller: seller.clone(),
            messages: Vec::new(),
            last_message: now,
            is_active: true,
            created_at: now,
        };

        match self.chats.create(chat).await {
            Ok(created) => {
                tracing::info!(chat_id = %created.id_string(), product = %product, buyer = %buyer.id, "Chat created");
                Ok(created)
            }
            // Another request created the same thread first
            Err(RepoError::Duplicate(_)) => self
                .chats
                .find_by_triple(&product, &buyer.id, &seller)
                .await?
                .ok_or_else(|| AppError::database("Chat vanished after duplicate insert")),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a message; returns the stored message
    pub async fn send_message(
        &self,
        chat_id: &str,
        sender: &CurrentUser,
        content: Option<&str>,
        image: Option<ImageRef>,
    ) -> AppResult<ChatMessage> {
        let message = build_message(&sender.id, content, image)?;
        let (record, _) = self.load_for(chat_id, sender).await?;

        let chat = self.chats.append_message(&record, message.clone()).await?;
        tracing::debug!(
            chat_id = %record,
            sender = %sender.id,
            messages = chat.messages.len(),
            "Message appended"
        );
        Ok(message)
    }

    /// Mark every message from the other participant as read
    pub async fn mark_read(&self, chat_id: &str, reader: &CurrentUser) -> AppResult<Chat> {
        for _ in 0..MARK_READ_ATTEMPTS {
            let (record, chat) = self.load_for(chat_id, reader).await?;
            let Some(messages) = mark_read_for(&chat.messages, &reader.id) else {
                return Ok(chat);
            };
            let expected = chat.messages.iter().map(|m| m.is_read).collect();
            if self
                .chats
                .replace_messages_if_unchanged(&record, expected, messages)
                .await?
            {
                return self
                    .chats
                    .find_by_id(&record)
                    .await?
                    .ok_or_else(|| chat_not_found(chat_id));
            }
            tracing::debug!(chat_id = %record, "Chat changed during mark-read, retrying");
        }
        Err(AppError::database("Chat is busy, try again"))
    }

    /// Threads the caller takes part in, most recent first
    pub async fn list_for_user(&self, user: &CurrentUser) -> AppResult<Vec<ChatView>> {
        let chats = self.chats.find_for_user(&user.id).await?;
        self.annotate(chats, &user.id).await
    }

    /// One thread, participants only
    pub async fn get(&self, chat_id: &str, user: &CurrentUser) -> AppResult<ChatView> {
        let (_, chat) = self.load_for(chat_id, user).await?;
        let mut views = self.annotate(vec![chat], &user.id).await?;
        views.pop().ok_or_else(|| chat_not_found(chat_id))
    }

    async fn load_for(&self, chat_id: &str, user: &CurrentUser) -> AppResult<(RecordId, Chat)> {
        let record = parse_id(CHAT_TABLE, chat_id)?;
        let chat = self
            .chats
            .find_by_id(&record)
            .await?
            .ok_or_else(|| chat_not_found(chat_id))?;
        if !chat.is_participant(&user.id) {
            return Err(AppError::new(ErrorCode::NotParticipant));
        }
        Ok((record, chat))
    }

    async fn annotate(&self, chats: Vec<Chat>, viewer: &str) -> AppResult<Vec<ChatView>> {
        let product_ids: Vec<RecordId> = chats
            .iter()
            .filter_map(|c| parse_id(BOOK_TABLE, &c.product).ok())
            .collect();
        let titles: HashMap<String, String> = self
            .books
            .find_many(product_ids)
            .await?
            .into_iter()
            .map(|b| (b.id_string(), b.title))
            .collect();

        let user_ids: Vec<RecordId> = chats
            .iter()
            .flat_map(|c| [c.buyer.as_str(), c.seller.as_str()])
            .filter_map(|id| parse_id(USER_TABLE, id).ok())
            .collect();
        let names: HashMap<String, String> = self
            .users
            .find_many(user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id_string(), u.user_name))
            .collect();

        Ok(chats
            .into_iter()
            .map(|chat| ChatView {
                product_title: titles.get(&chat.product).cloned(),
                buyer_name: names.get(&chat.buyer).cloned(),
                seller_name: names.get(&chat.seller).cloned(),
                unread_count: chat.unread_for(viewer),
                chat,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_is_rejected() {
        let err = build_message("app_user:a", Some("   "), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyMessage);
        let err = build_message("app_user:a", None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyMessage);
    }

    #[test]
    fn test_message_content_is_trimmed() {
        let msg = build_message("app_user:a", Some("  hello "), None).unwrap();
        assert_eq!(msg.content.as_deref(), Some("hello"));
        assert!(!msg.is_read);

        let image_only =
            build_message("app_user:a", None, Some(ImageRef::from_url("http://x/p.png"))).unwrap();
        assert!(image_only.content.is_none());
    }

    #[test]
    fn test_mark_read_only_touches_other_sender() {
        let a = build_message("app_user:a", Some("hi"), None).unwrap();
        let b = build_message("app_user:b", Some("yo"), None).unwrap();
        let messages = vec![a, b];

        let updated = mark_read_for(&messages, "app_user:a").unwrap();
        assert!(!updated[0].is_read);
        assert!(updated[1].is_read);

        assert!(mark_read_for(&updated, "app_user:a").is_none());
    }
}
