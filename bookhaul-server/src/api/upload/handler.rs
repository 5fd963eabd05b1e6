//! Image Upload Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use http::{StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::ImageRef;
use crate::utils::validation::{MAX_URL_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Multipart field names accepted for the image
const IMAGE_FIELDS: &[&str] = &["image", "file"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub image_url: String,
    pub public_id: String,
}

/// Image reference in a request body: a bare URL or `{url, publicId?}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageInput {
    Url(String),
    #[serde(rename_all = "camelCase")]
    Object {
        url: String,
        #[serde(default)]
        public_id: Option<String>,
    },
}

impl ImageInput {
    pub fn into_image_ref(self) -> AppResult<ImageRef> {
        let (url, public_id) = match self {
            ImageInput::Url(url) => (url, None),
            ImageInput::Object { url, public_id } => (url, public_id),
        };
        let url = url.trim().to_string();
        validate_required_text(&url, "image url", MAX_URL_LEN)?;
        Ok(match public_id.filter(|p| !p.trim().is_empty()) {
            Some(public_id) => ImageRef { url, public_id },
            None => ImageRef::from_url(url),
        })
    }
}

/// Read the first image field of a multipart body
///
/// Returns the bytes and the client-side file name, if any.
pub async fn read_image_field(
    multipart: &mut Multipart,
) -> AppResult<(Bytes, Option<String>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        if !field.name().is_some_and(|n| IMAGE_FIELDS.contains(&n)) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
        return Ok((data, file_name));
    }

    Err(AppError::with_message(
        ErrorCode::RequiredField,
        "No image file provided. Field name must be 'image'",
    ))
}

/// Upload a review or chat image
pub async fn upload(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let (data, file_name) = read_image_field(&mut multipart).await?;
    let image = state.blobs.upload(&data, file_name.as_deref()).await?;

    tracing::info!(
        user_id = %current_user.id,
        public_id = %image.public_id,
        size = data.len(),
        "Image uploaded"
    );

    Ok(Json(UploadResponse {
        message: "Image uploaded successfully",
        image_url: image.url,
        public_id: image.public_id,
    }))
}

/// Serve a stored image
pub async fn serve_image(
    State(state): State<ServerState>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    let content = state
        .blobs
        .read(&file)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Image {}", file)))?;

    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        content,
    )
        .into_response())
}
