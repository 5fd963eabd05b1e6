//! Book Repository

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{BOOK_TABLE, Book, BookPatch};
use crate::utils::time::now_millis;

#[derive(Clone)]
pub struct BookRepository {
    base: BaseRepository,
}

#[derive(Debug, Default, Deserialize)]
struct CountRow {
    #[serde(default)]
    count: i64,
}

impl BookRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All books, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Book>> {
        let books: Vec<Book> = self
            .base
            .db()
            .query("SELECT * FROM book ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(books)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Book>> {
        let book: Option<Book> = self.base.db().select(id.clone()).await?;
        Ok(book)
    }

    /// Fetch several books in one round trip
    pub async fn find_many(&self, ids: Vec<RecordId>) -> RepoResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let books: Vec<Book> = self
            .base
            .db()
            .query("SELECT * FROM $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(books)
    }

    pub async fn create(&self, book: Book) -> RepoResult<Book> {
        let created: Option<Book> = self.base.db().create(BOOK_TABLE).content(book).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create book".to_string()))
    }

    /// Merge a partial update; `None` when the book does not exist
    pub async fn update(&self, id: &RecordId, patch: BookPatch) -> RepoResult<Option<Book>> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }
        let updated: Option<Book> = self.base.db().update(id.clone()).merge(patch).await?;
        Ok(updated)
    }

    /// Hard delete; returns the removed book
    pub async fn delete(&self, id: &RecordId) -> RepoResult<Option<Book>> {
        let deleted: Option<Book> = self.base.db().delete(id.clone()).await?;
        Ok(deleted)
    }

    /// Take `qty` units out of stock if enough are available
    ///
    /// Single conditional statement: returns `false` when the book is
    /// missing or holds fewer than `qty` units, leaving it untouched.
    pub async fn reserve_stock(&self, id: &RecordId, qty: i64) -> RepoResult<bool> {
        let updated: Vec<Book> = self
            .base
            .db()
            .query(
                r#"UPDATE $id SET
                    quantity -= $qty,
                    sold += $qty,
                    updatedAt = $now
                WHERE quantity >= $qty
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("qty", qty))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// Give back units taken by [`reserve_stock`](Self::reserve_stock)
    pub async fn release_stock(&self, id: &RecordId, qty: i64) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"UPDATE $id SET
                    quantity += $qty,
                    sold = math::max([0, sold - $qty]),
                    updatedAt = $now"#,
            )
            .bind(("id", id.clone()))
            .bind(("qty", qty))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Persist recomputed rating aggregates
    pub async fn set_rating(&self, id: &RecordId, average: f64, count: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET averageRating = $avg, reviewCount = $count")
            .bind(("id", id.clone()))
            .bind(("avg", average))
            .bind(("count", count))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn count(&self) -> RepoResult<i64> {
        let row: Option<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM book GROUP ALL")
            .await?
            .take(0)?;
        Ok(row.unwrap_or_default().count)
    }

    pub async fn count_trending(&self) -> RepoResult<i64> {
        let row: Option<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM book WHERE trending = true GROUP ALL")
            .await?
            .take(0)?;
        Ok(row.unwrap_or_default().count)
    }
}
