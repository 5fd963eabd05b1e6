//! Authentication Handlers
//!
//! Registration, login and the user's own profile, plus user
//! administration for admins.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::UserRole;
use validator::Validate;

use crate::api::ValidJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{NewUser, ProfilePatch, ShippingAddress, USER_TABLE, User};
use crate::db::repository::{RepoError, parse_id};
use crate::security_log;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_SHORT_TEXT_LEN, trimmed, validate_optional_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub user_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    state
        .jwt_service
        .generate_token(&user.id_string(), &user.email, &user.user_name, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
}

fn user_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {} not found", id))
}

/// Map a duplicate insert onto the field that collided
fn duplicate_to_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) if msg.to_lowercase().contains("email") => {
            AppError::with_message(ErrorCode::EmailExists, "Email already exists")
        }
        RepoError::Duplicate(_) => {
            AppError::with_message(ErrorCode::UsernameExists, "Username already exists")
        }
        other => other.into(),
    }
}

/// Register a customer account
///
/// The role is always `user`; admins are created at bootstrap or promoted
/// by another admin.
pub async fn register(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .users()
        .create(NewUser {
            email: req.email.trim().to_lowercase(),
            user_name: req.user_name.trim().to_string(),
            password: req.password,
            role: UserRole::User,
        })
        .await
        .map_err(duplicate_to_error)?;

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id_string(), user_name = %user.user_name, "User registered");

    Ok(Json(AuthResponse {
        message: "User registered successfully",
        token,
        user,
    }))
}

/// Log in with email and password
pub async fn login(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = req.email.trim().to_lowercase();
    let user = state.users().find_by_email(&email).await?;

    let user = match user {
        Some(u) if password_matches(&u, &req.password)? => u,
        _ => {
            security_log!("WARN", "login_failed", email = email.clone());
            return Err(AppError::with_message(
                ErrorCode::InvalidCredentials,
                "Invalid email or password",
            ));
        }
    };

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id_string(), "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful",
        token,
        user,
    }))
}

/// Log in to the dashboard; only admin accounts pass
pub async fn admin_login(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<AdminLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user_name = req.user_name.trim().to_string();
    let user = state.users().find_by_user_name(&user_name).await?;

    let user = match user {
        Some(u) if u.is_admin() && password_matches(&u, &req.password)? => u,
        _ => {
            security_log!("WARN", "admin_login_failed", user_name = user_name.clone());
            return Err(AppError::with_message(
                ErrorCode::InvalidCredentials,
                "Invalid admin credentials",
            ));
        }
    };

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id_string(), "Admin logged in");

    Ok(Json(AuthResponse {
        message: "Admin login successful",
        token,
        user,
    }))
}

fn password_matches(user: &User, password: &str) -> AppResult<bool> {
    user.verify_password(password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))
}

async fn load_self(state: &ServerState, current_user: &CurrentUser) -> AppResult<User> {
    let id = parse_id(USER_TABLE, &current_user.id)?;
    state
        .users()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| user_not_found(&current_user.id))
}

/// The account behind the token
pub async fn verify(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    Ok(Json(load_self(&state, &current_user).await?))
}

pub async fn profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    Ok(Json(load_self(&state, &current_user).await?))
}

/// Partial profile update; address fields merge into the stored address
pub async fn update_profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    ValidJson(req): ValidJson<ProfileUpdateRequest>,
) -> AppResult<Json<User>> {
    let existing = load_self(&state, &current_user).await?;

    let shipping_address = match req.shipping_address {
        Some(patch) => {
            validate_optional_text(&patch.street, "street", MAX_ADDRESS_LEN)?;
            for (value, field) in [
                (&patch.city, "city"),
                (&patch.state, "state"),
                (&patch.zipcode, "zipcode"),
                (&patch.country, "country"),
            ] {
                validate_optional_text(value, field, MAX_SHORT_TEXT_LEN)?;
            }
            let current = existing.shipping_address.unwrap_or_default();
            Some(current.merged(&patch))
        }
        None => None,
    };

    let patch = ProfilePatch {
        first_name: trimmed(req.first_name.as_deref()),
        last_name: trimmed(req.last_name.as_deref()),
        phone: trimmed(req.phone.as_deref()),
        shipping_address,
        updated_at: now_millis(),
    };

    let id = parse_id(USER_TABLE, &current_user.id)?;
    let user = state.users().update_profile(&id, patch).await?;
    tracing::info!(user_id = %current_user.id, "Profile updated");
    Ok(Json(user))
}

/// All accounts (admin)
pub async fn list_users(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users().find_all().await?))
}

pub async fn get_user(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let record = parse_id(USER_TABLE, &id)?;
    let user = state
        .users()
        .find_by_id(&record)
        .await?
        .ok_or_else(|| user_not_found(&id))?;
    Ok(Json(user))
}

/// Delete an account (admin, never their own)
pub async fn delete_user(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let record = parse_id(USER_TABLE, &id)?;
    if record.to_string() == current_user.id {
        return Err(AppError::with_message(
            ErrorCode::CannotModifySelf,
            "Cannot delete yourself",
        ));
    }

    state
        .users()
        .delete(&record)
        .await?
        .ok_or_else(|| user_not_found(&id))?;

    security_log!(
        "INFO",
        "user_deleted",
        user_id = record.to_string(),
        by = current_user.id.clone()
    );
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// Toggle an account between `user` and `admin` (never their own)
pub async fn toggle_role(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let record = parse_id(USER_TABLE, &id)?;
    if record.to_string() == current_user.id {
        return Err(AppError::with_message(
            ErrorCode::CannotModifySelf,
            "Cannot change your own role",
        ));
    }

    let users = state.users();
    let existing = users
        .find_by_id(&record)
        .await?
        .ok_or_else(|| user_not_found(&id))?;
    let updated = users.set_role(&record, existing.role.toggled()).await?;

    security_log!(
        "INFO",
        "role_changed",
        user_id = record.to_string(),
        role = updated.role.as_str(),
        by = current_user.id.clone()
    );
    Ok(Json(updated))
}
