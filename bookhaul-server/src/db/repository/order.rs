//! Order Repository

use serde::{Deserialize, Serialize};
use shared::{OrderStatus, PaymentStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{ORDER_TABLE, Order, PaymentDetails};

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

/// Status columns written by a committed transition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusPatch {
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    pub updated_at: i64,
}

/// Projection used by the sales rollup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    pub created_at: i64,
    pub total_price: f64,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// Orders placed with `email`, newest first
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM book_order WHERE email = $email ORDER BY createdAt DESC")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM book_order ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Write the outcome of a status transition planned from `from`
    ///
    /// Matches only while the stored statuses still equal `from`. Returns
    /// `None` when they changed in between (or the write lost a race) so
    /// the caller can re-plan against the fresh document.
    pub async fn apply_status_from(
        &self,
        id: &RecordId,
        from: (OrderStatus, PaymentStatus),
        patch: OrderStatusPatch,
    ) -> RepoResult<Option<Order>> {
        let result = self
            .base
            .db()
            .query(
                r#"UPDATE $id MERGE $patch
                WHERE orderStatus = $from_order AND paymentStatus = $from_payment
                RETURN AFTER"#,
            )
            .bind(("id", id.clone()))
            .bind(("patch", patch))
            .bind(("from_order", from.0.as_str()))
            .bind(("from_payment", from.1.as_str()))
            .await;

        let updated: Vec<Order> = match result.and_then(|mut r| r.take::<Vec<Order>>(0)) {
            Ok(rows) => rows,
            Err(e) => match RepoError::from(e) {
                RepoError::Conflict(msg) => {
                    tracing::debug!(order_id = %id, error = %msg, "Status write conflicted");
                    return Ok(None);
                }
                other => return Err(other),
            },
        };
        Ok(updated.into_iter().next())
    }

    /// Whether `email` has a delivered order containing `book_id`
    pub async fn has_delivered_with_book(&self, email: &str, book_id: &str) -> RepoResult<bool> {
        let ids: Vec<RecordId> = self
            .base
            .db()
            .query(
                r#"SELECT VALUE id FROM book_order
                WHERE email = $email
                    AND orderStatus = $status
                    AND items.productId CONTAINS $book
                LIMIT 1"#,
            )
            .bind(("email", email.to_string()))
            .bind(("status", OrderStatus::Delivered.as_str()))
            .bind(("book", book_id.to_string()))
            .await?
            .take(0)?;
        Ok(!ids.is_empty())
    }

    pub async fn sales_rows(&self) -> RepoResult<Vec<SalesRow>> {
        let rows: Vec<SalesRow> = self
            .base
            .db()
            .query("SELECT createdAt, totalPrice FROM book_order")
            .await?
            .take(0)?;
        Ok(rows)
    }
}
