//! Book API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};
use shared::Category;
use validator::Validate;

use crate::api::ValidJson;
use crate::api::upload::{ImageInput, UploadResponse, read_image_field};
use crate::core::ServerState;
use crate::db::models::{BOOK_TABLE, Book, BookPatch, serde_helpers};
use crate::db::repository::parse_id;
use crate::orders::money::MAX_UNIT_PRICE;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Create/edit body
///
/// Every field is optional at the type level; create checks the required
/// ones. Numbers may arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_i64")]
    pub publication_date: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_f64")]
    pub old_price: Option<f64>,
    pub cover_image: Option<ImageInput>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_bool")]
    pub trending: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct BookMessage {
    pub message: &'static str,
    pub book: Book,
}

fn book_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::BookNotFound, format!("Book {} not found", id))
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, format!("{} is required", field))
            .with_detail("field", field)
    })
}

fn parse_category(raw: &str) -> AppResult<Category> {
    raw.parse::<Category>().map_err(|_| {
        AppError::with_message(ErrorCode::InvalidCategory, format!("Invalid category: {}", raw))
    })
}

fn check_price(value: Option<f64>, field: &str) -> AppResult<()> {
    match value {
        Some(p) if p < 0.0 => Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("{} must not be negative", field),
        )),
        Some(p) if p > MAX_UNIT_PRICE => Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("{} must not exceed {}", field, MAX_UNIT_PRICE),
        )),
        _ => Ok(()),
    }
}

fn check_quantity(value: Option<i64>) -> AppResult<()> {
    match value {
        Some(q) if q < 0 => Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            "quantity must not be negative",
        )),
        _ => Ok(()),
    }
}

/// Checks shared by create and edit; returns the normalized patch
fn validated_patch(input: BookInput) -> AppResult<BookPatch> {
    let title = input.title.map(|t| t.trim().to_string());
    if let Some(title) = &title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    let author = input.author.map(|a| a.trim().to_string());
    if let Some(author) = &author {
        validate_required_text(author, "author", MAX_NAME_LEN)?;
    }
    validate_optional_text(&input.description, "description", MAX_NOTE_LEN)?;

    let category = input.category.as_deref().map(parse_category).transpose()?;
    check_price(input.price, "price")?;
    check_price(input.old_price, "oldPrice")?;
    check_quantity(input.quantity)?;

    let cover_image = input
        .cover_image
        .map(ImageInput::into_image_ref)
        .transpose()?;

    Ok(BookPatch {
        title,
        author,
        category,
        description: input.description,
        publication_date: input.publication_date,
        price: input.price,
        old_price: input.old_price,
        cover_image,
        quantity: input.quantity,
        trending: input.trending,
        updated_at: now_millis(),
    })
}

/// List all books, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.books().find_all().await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let record = parse_id(BOOK_TABLE, &id)?;
    let book = state
        .books()
        .find_by_id(&record)
        .await?
        .ok_or_else(|| book_not_found(&id))?;
    Ok(Json(book))
}

/// Create a book (admin)
pub async fn create(
    State(state): State<ServerState>,
    ValidJson(input): ValidJson<BookInput>,
) -> AppResult<Json<BookMessage>> {
    let patch = validated_patch(input)?;
    let now = patch.updated_at;

    let book = Book {
        id: None,
        title: required(patch.title, "title")?,
        author: required(patch.author, "author")?,
        category: required(patch.category, "category")?,
        description: patch.description,
        publication_date: patch.publication_date,
        price: required(patch.price, "price")?,
        old_price: patch.old_price,
        cover_image: required(patch.cover_image, "coverImage")?,
        quantity: required(patch.quantity, "quantity")?,
        sold: 0,
        trending: patch.trending.unwrap_or(false),
        average_rating: 0.0,
        review_count: 0,
        created_at: now,
        updated_at: now,
    };

    let created = state.books().create(book).await?;
    tracing::info!(book_id = %created.id_string(), title = %created.title, "Book created");

    Ok(Json(BookMessage {
        message: "Book created successfully",
        book: created,
    }))
}

/// Partial update (admin)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<BookInput>,
) -> AppResult<Json<BookMessage>> {
    let record = parse_id(BOOK_TABLE, &id)?;
    let patch = validated_patch(input)?;

    let book = state
        .books()
        .update(&record, patch)
        .await?
        .ok_or_else(|| book_not_found(&id))?;
    tracing::info!(book_id = %record, "Book updated");

    Ok(Json(BookMessage {
        message: "Book updated successfully",
        book,
    }))
}

/// Hard delete (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookMessage>> {
    let record = parse_id(BOOK_TABLE, &id)?;
    let book = state
        .books()
        .delete(&record)
        .await?
        .ok_or_else(|| book_not_found(&id))?;
    tracing::info!(book_id = %record, "Book deleted");

    Ok(Json(BookMessage {
        message: "Book deleted successfully",
        book,
    }))
}

/// Upload a cover image (admin)
pub async fn upload_cover(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let (data, file_name) = read_image_field(&mut multipart).await?;
    let image = state.blobs.upload(&data, file_name.as_deref()).await?;

    Ok(Json(UploadResponse {
        message: "Image uploaded successfully",
        image_url: image.url,
        public_id: image.public_id,
    }))
}
