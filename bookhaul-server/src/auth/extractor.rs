//! `CurrentUser` extractor
//!
//! Handlers behind `require_auth` get the user the middleware stored; any
//! other handler validates the bearer header itself.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{CurrentUser, middleware::authenticate};
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = authenticate(&parts.headers, &parts.uri, &state.jwt_service)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
