//! User Repository

use shared::UserRole;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{NewUser, ProfilePatch, User};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM app_user ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        Ok(user)
    }

    pub async fn find_many(&self, ids: Vec<RecordId>) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM app_user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_user_name(&self, user_name: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM app_user WHERE userName = $user_name LIMIT 1")
            .bind(("user_name", user_name.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Oldest admin account, if any
    pub async fn find_first_admin(&self) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM app_user WHERE role = 'admin' ORDER BY createdAt ASC LIMIT 1")
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create an account
    ///
    /// Email and user name are checked up front for a precise message;
    /// the unique indexes catch anything that races past the check.
    pub async fn create(&self, data: NewUser) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate("Email already exists".to_string()));
        }
        if self.find_by_user_name(&data.user_name).await?.is_some() {
            return Err(RepoError::Duplicate("Username already exists".to_string()));
        }

        let password_hash = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
        let now = now_millis();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE app_user SET
                    email = $email,
                    userName = $user_name,
                    passwordHash = $password_hash,
                    role = $role,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("email", data.email))
            .bind(("user_name", data.user_name))
            .bind(("password_hash", password_hash))
            .bind(("role", data.role))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    pub async fn update_profile(&self, id: &RecordId, patch: ProfilePatch) -> RepoResult<User> {
        let updated: Option<User> = self.base.db().update(id.clone()).merge(patch).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    pub async fn set_role(&self, id: &RecordId, role: UserRole) -> RepoResult<User> {
        let updated: Vec<User> = self
            .base
            .db()
            .query("UPDATE $id SET role = $role, updatedAt = $now RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("role", role))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<Option<User>> {
        let deleted: Option<User> = self.base.db().delete(id.clone()).await?;
        Ok(deleted)
    }
}
