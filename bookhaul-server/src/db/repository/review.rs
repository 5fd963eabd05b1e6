//! Review Repository

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{ImageRef, REVIEW_TABLE, Review};

#[derive(Clone)]
pub struct ReviewRepository {
    base: BaseRepository,
}

/// Author-editable review fields
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRef>>,
    pub updated_at: i64,
}

impl ReviewRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a review; the (book, user) unique index yields `Duplicate`
    pub async fn create(&self, review: Review) -> RepoResult<Review> {
        let created: Option<Review> = self.base.db().create(REVIEW_TABLE).content(review).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create review".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Review>> {
        let review: Option<Review> = self.base.db().select(id.clone()).await?;
        Ok(review)
    }

    /// Reviews of a book, newest first
    pub async fn find_by_book(&self, book_id: &str) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM review WHERE book = $book ORDER BY createdAt DESC")
            .bind(("book", book_id.to_string()))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM review ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(reviews)
    }

    pub async fn find_by_book_and_user(
        &self,
        book_id: &str,
        user_id: &str,
    ) -> RepoResult<Option<Review>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM review WHERE book = $book AND user = $user LIMIT 1")
            .bind(("book", book_id.to_string()))
            .bind(("user", user_id.to_string()))
            .await?;
        let reviews: Vec<Review> = result.take(0)?;
        Ok(reviews.into_iter().next())
    }

    pub async fn update(&self, id: &RecordId, patch: ReviewPatch) -> RepoResult<Review> {
        let updated: Option<Review> = self.base.db().update(id.clone()).merge(patch).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<Option<Review>> {
        let deleted: Option<Review> = self.base.db().delete(id.clone()).await?;
        Ok(deleted)
    }

    /// Every rating given to a book
    pub async fn ratings_for_book(&self, book_id: &str) -> RepoResult<Vec<i64>> {
        let ratings: Vec<i64> = self
            .base
            .db()
            .query("SELECT VALUE rating FROM review WHERE book = $book")
            .bind(("book", book_id.to_string()))
            .await?
            .take(0)?;
        Ok(ratings)
    }
}
