//! Startup account setup
//!
//! - [`ensure_admin`] creates the configured admin when no admin exists
//! - [`resolve_seller`] picks the account that answers buyer chats

use shared::UserRole;

use crate::core::Config;
use crate::db::models::{NewUser, USER_TABLE};
use crate::db::repository::{RepoResult, UserRepository, parse_id};

/// Create the bootstrap admin if configured and no admin exists yet
///
/// Returns the id of the admin that was created, if any.
pub async fn ensure_admin(users: &UserRepository, config: &Config) -> RepoResult<Option<String>> {
    let Some(admin) = &config.admin else {
        return Ok(None);
    };

    if let Some(existing) = users.find_first_admin().await? {
        tracing::debug!(admin_id = %existing.id_string(), "Admin account present");
        return Ok(None);
    }

    let created = users
        .create(NewUser {
            email: admin.email.clone(),
            user_name: admin.user_name.clone(),
            password: admin.password.clone(),
            role: UserRole::Admin,
        })
        .await?;
    tracing::info!(
        admin_id = %created.id_string(),
        user_name = %created.user_name,
        "Bootstrap admin created"
    );
    Ok(Some(created.id_string()))
}

/// Seller for chats: `SELLER_USER_ID`, else the bootstrap admin, else the
/// oldest admin
pub async fn resolve_seller(users: &UserRepository, config: &Config) -> RepoResult<Option<String>> {
    if let Some(raw) = &config.seller_user_id {
        let id = parse_id(USER_TABLE, raw)?;
        return match users.find_by_id(&id).await? {
            Some(user) => {
                tracing::info!(seller_id = %user.id_string(), "Chat seller from SELLER_USER_ID");
                Ok(Some(user.id_string()))
            }
            None => {
                tracing::warn!(seller_id = %raw, "SELLER_USER_ID does not name an existing user");
                Ok(None)
            }
        };
    }

    if let Some(admin) = &config.admin
        && let Some(user) = users.find_by_email(&admin.email).await?
        && user.is_admin()
    {
        tracing::info!(seller_id = %user.id_string(), "Chat seller is the bootstrap admin");
        return Ok(Some(user.id_string()));
    }

    let seller = users.find_first_admin().await?.map(|u| u.id_string());
    match &seller {
        Some(id) => tracing::info!(seller_id = %id, "Chat seller is the first admin"),
        None => tracing::warn!("No admin account found, chats are disabled until one exists"),
    }
    Ok(seller)
}
