//! Chat API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::api::ValidJson;
use crate::api::upload::ImageInput;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Chat, ChatMessage};
use crate::services::ChatView;
use crate::utils::AppResult;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<ImageInput>,
}

/// Threads the caller is part of, latest activity first
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ChatView>>> {
    Ok(Json(state.chats.list_for_user(&current_user).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(chat_id): Path<String>,
) -> AppResult<Json<ChatView>> {
    Ok(Json(state.chats.get(&chat_id, &current_user).await?))
}

/// Open the caller's thread about a book with the seller
pub async fn create_or_get(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<Chat>> {
    Ok(Json(
        state.chats.create_or_get(&product_id, &current_user).await?,
    ))
}

pub async fn send_message(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(chat_id): Path<String>,
    ValidJson(req): ValidJson<SendMessageRequest>,
) -> AppResult<Json<ChatMessage>> {
    let image = req.image.map(ImageInput::into_image_ref).transpose()?;
    let message = state
        .chats
        .send_message(&chat_id, &current_user, req.content.as_deref(), image)
        .await?;
    Ok(Json(message))
}

pub async fn mark_read(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(chat_id): Path<String>,
) -> AppResult<Json<Chat>> {
    Ok(Json(state.chats.mark_read(&chat_id, &current_user).await?))
}
