//! Review API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::ValidJson;
use crate::api::upload::ImageInput;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{ImageRef, Review};
use crate::services::ReviewView;
use crate::services::reviews::{NewReview, ReviewUpdate};
use crate::utils::AppResult;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReviewRequest {
    #[serde(alias = "bookId")]
    #[validate(length(min = 1, message = "Book is required"))]
    pub book: String,
    pub rating: i64,
    pub comment: String,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateReviewRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub images: Option<Vec<ImageInput>>,
}

#[derive(Debug, Serialize)]
pub struct ReviewMessage<T> {
    pub message: &'static str,
    pub review: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn image_refs(images: Vec<ImageInput>) -> AppResult<Vec<ImageRef>> {
    images.into_iter().map(ImageInput::into_image_ref).collect()
}

/// Review a book the caller has received
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    ValidJson(req): ValidJson<CreateReviewRequest>,
) -> AppResult<Json<ReviewMessage<ReviewView>>> {
    let input = NewReview {
        book_id: req.book,
        rating: req.rating,
        comment: req.comment,
        images: image_refs(req.images)?,
    };
    let review = state.reviews.create(&current_user, input).await?;

    Ok(Json(ReviewMessage {
        message: "Review created successfully",
        review,
    }))
}

/// Reviews of one book, newest first
pub async fn list_for_book(
    State(state): State<ServerState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<Vec<ReviewView>>> {
    Ok(Json(state.reviews.list_for_book(&book_id).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateReviewRequest>,
) -> AppResult<Json<ReviewMessage<Review>>> {
    let input = ReviewUpdate {
        rating: req.rating,
        comment: req.comment,
        images: req.images.map(image_refs).transpose()?,
    };
    let review = state.reviews.update(&current_user, &id, input).await?;

    Ok(Json(ReviewMessage {
        message: "Review updated successfully",
        review,
    }))
}

pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.reviews.delete(&current_user, &id).await?;
    Ok(Json(MessageResponse {
        message: "Review deleted successfully",
    }))
}

/// Every review with reviewer and book context (admin)
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<ReviewView>>> {
    Ok(Json(state.reviews.list_all().await?))
}
