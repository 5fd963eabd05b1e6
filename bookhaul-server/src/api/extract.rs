//! Request body extractor
//!
//! [`ValidJson`] deserializes the body like `axum::Json` and then runs the
//! DTO's `validator` rules. Both kinds of failure become a 400 in the
//! usual error envelope instead of axum's plain-text rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::utils::validation::validate_dto;
use crate::utils::{AppError, ErrorCode};

/// JSON body that has passed its `validator` rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let code = match &rejection {
        JsonRejection::MissingJsonContentType(_) => ErrorCode::InvalidFormat,
        JsonRejection::JsonSyntaxError(_) => ErrorCode::InvalidFormat,
        _ => ErrorCode::ValidationFailed,
    };
    AppError::with_message(code, rejection.body_text())
}

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        validate_dto(&value)?;
        Ok(Self(value))
    }
}
