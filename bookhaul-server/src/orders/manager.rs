//! OrderService - order creation and status changes
//!
//! # Create flow
//!
//! ```text
//! create_order(input)
//!     ├─ 1. Merge duplicate lines
//!     ├─ 2. Fetch all referenced books in one query
//!     ├─ 3. Collect every invalid line (quantity, missing, stock)
//!     ├─ 4. Compute the total server-side (Decimal)
//!     ├─ 5. Reserve stock line by line (conditional update)
//!     │     └─ any line fails -> release earlier lines, report
//!     └─ 6. Persist as Pending/Pending
//!           └─ write fails -> release every line
//! ```
//!
//! Status changes go through [`transition`](super::transition) and are
//! written with a conditional merge on the statuses they were planned
//! from.

use std::collections::HashMap;

use serde::Serialize;
use shared::{AppError, ErrorCode, OrderStatus, PaymentMethod, PaymentStatus};
use surrealdb::RecordId;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use super::money;
use super::payment::{PaymentClaim, PaymentGateways};
use super::transition::{self, OrderState, TransitionPlan};
use crate::db::models::{Address, BOOK_TABLE, Book, ORDER_TABLE, Order, OrderItem, PaymentDetails};
use crate::db::repository::order::OrderStatusPatch;
use crate::db::repository::{BookRepository, OrderRepository, RepoError, parse_id};
use crate::utils::AppResult;
use crate::utils::time::now_millis;

const UNKNOWN_PRODUCT: &str = "Unknown Product";
const TRANSITION_ATTEMPTS: usize = 5;

/// One requested line
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Validated checkout input
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub items: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
}

/// Payment confirmation sent back by the storefront
#[derive(Debug, Clone)]
pub struct PaymentVerification {
    pub order_id: String,
    pub claim: PaymentClaim,
}

/// Entry of the `details.outOfStock` report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnavailableItem {
    pub id: String,
    pub title: String,
    pub reason: String,
}

impl UnavailableItem {
    fn new(id: impl Into<String>, title: impl Into<String>, reason: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            reason: reason.to_string(),
        }
    }
}

fn out_of_stock(items: Vec<UnavailableItem>) -> AppError {
    let report = serde_json::to_value(&items).unwrap_or_default();
    AppError::with_message(ErrorCode::OutOfStock, "Some items are not available")
        .with_detail("outOfStock", report)
}

fn order_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
}

/// Sum quantities of lines naming the same product, keeping first-seen order
pub fn merge_lines(lines: Vec<OrderLine>) -> Vec<OrderLine> {
    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for line in lines {
        let key = line.product_id.trim().to_string();
        match index.get(&key) {
            Some(&i) => merged[i].quantity = merged[i].quantity.saturating_add(line.quantity),
            None => {
                index.insert(key.clone(), merged.len());
                merged.push(OrderLine {
                    product_id: key,
                    quantity: line.quantity,
                });
            }
        }
    }
    merged
}

/// A line that passed validation, with the book it refers to
struct CheckedLine {
    id: RecordId,
    book: Book,
    quantity: i64,
}

/// Check every line against the fetched books
///
/// Returns the checked lines, or all failures at once.
fn check_lines(
    lines: &[OrderLine],
    books: &HashMap<String, Book>,
) -> Result<Vec<CheckedLine>, Vec<UnavailableItem>> {
    let mut checked = Vec::with_capacity(lines.len());
    let mut failures = Vec::new();

    for line in lines {
        let parsed = parse_id(BOOK_TABLE, &line.product_id).ok();
        let book = parsed.as_ref().and_then(|id| books.get(&id.to_string()));

        if line.quantity <= 0 {
            let title = book.map(|b| b.title.as_str()).unwrap_or(UNKNOWN_PRODUCT);
            failures.push(UnavailableItem::new(&line.product_id, title, "Invalid quantity"));
            continue;
        }

        match (parsed, book) {
            (Some(id), Some(book)) => {
                if book.quantity < line.quantity {
                    failures.push(UnavailableItem::new(
                        &line.product_id,
                        &book.title,
                        "Insufficient stock",
                    ));
                } else {
                    checked.push(CheckedLine {
                        id,
                        book: book.clone(),
                        quantity: line.quantity,
                    });
                }
            }
            _ => failures.push(UnavailableItem::new(
                &line.product_id,
                UNKNOWN_PRODUCT,
                "Not found",
            )),
        }
    }

    if failures.is_empty() {
        Ok(checked)
    } else {
        Err(failures)
    }
}

#[derive(Clone)]
pub struct OrderService {
    books: BookRepository,
    orders: OrderRepository,
    gateways: PaymentGateways,
}

impl OrderService {
    pub fn new(db: Surreal<Db>, gateways: PaymentGateways) -> Self {
        Self {
            books: BookRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            gateways,
        }
    }

    /// Validate stock, reserve it and persist the order
    pub async fn create_order(&self, input: NewOrder) -> AppResult<Order> {
        let lines = merge_lines(input.items);
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let ids: Vec<RecordId> = lines
            .iter()
            .filter_map(|l| parse_id(BOOK_TABLE, &l.product_id).ok())
            .collect();
        let books: HashMap<String, Book> = self
            .books
            .find_many(ids)
            .await?
            .into_iter()
            .map(|b| (b.id_string(), b))
            .collect();

        let checked = check_lines(&lines, &books).map_err(|failures| {
            tracing::info!(
                email = %input.email,
                failures = failures.len(),
                "Order rejected: items unavailable"
            );
            out_of_stock(failures)
        })?;

        let total = money::order_total(checked.iter().map(|l| (l.book.price, l.quantity)));

        self.reserve_all(&checked).await?;

        let now = now_millis();
        let order = Order {
            id: None,
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            items: checked
                .iter()
                .map(|l| OrderItem {
                    product_id: l.id.to_string(),
                    title: l.book.title.clone(),
                    unit_price: l.book.price,
                    quantity: l.quantity,
                })
                .collect(),
            total_price: money::to_f64(total),
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            payment_details: None,
            created_at: now,
            updated_at: now,
        };

        match self.orders.create(order).await {
            Ok(created) => {
                tracing::info!(
                    order_id = %created.id_string(),
                    email = %created.email,
                    total = created.total_price,
                    method = %created.payment_method,
                    "Order created"
                );
                Ok(created)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist order, releasing stock");
                self.release_all(&checked).await;
                Err(e.into())
            }
        }
    }

    /// Reserve every line or none
    async fn reserve_all(&self, lines: &[CheckedLine]) -> AppResult<()> {
        for (i, line) in lines.iter().enumerate() {
            let reserved = match self.books.reserve_stock(&line.id, line.quantity).await {
                Ok(reserved) => reserved,
                Err(RepoError::Conflict(msg)) => {
                    tracing::warn!(book_id = %line.id, error = %msg, "Stock reservation conflicted");
                    false
                }
                Err(e) => {
                    self.release_all(&lines[..i]).await;
                    return Err(e.into());
                }
            };

            if !reserved {
                self.release_all(&lines[..i]).await;
                return Err(out_of_stock(vec![UnavailableItem::new(
                    line.id.to_string(),
                    &line.book.title,
                    "Insufficient stock",
                )]));
            }
        }
        Ok(())
    }

    async fn release_all(&self, lines: &[CheckedLine]) {
        for line in lines {
            if let Err(e) = self.books.release_stock(&line.id, line.quantity).await {
                tracing::error!(
                    book_id = %line.id,
                    quantity = line.quantity,
                    error = %e,
                    "Failed to release reserved stock"
                );
            }
        }
    }

    async fn load(&self, id: &str) -> AppResult<(RecordId, Order)> {
        let record = parse_id(ORDER_TABLE, id)?;
        let order = self
            .orders
            .find_by_id(&record)
            .await?
            .ok_or_else(|| order_not_found(id))?;
        Ok((record, order))
    }

    /// Plan a transition and write it only if the order is unchanged
    ///
    /// Another writer may commit between the read and the write; the
    /// conditional update then matches nothing and the plan is rebuilt
    /// from the fresh order, so every guard sees the state it replaces.
    /// Returns the order as it was before the write and after it.
    async fn commit_transition<F>(
        &self,
        id: &str,
        plan: F,
        payment_details: Option<PaymentDetails>,
    ) -> AppResult<(Order, Order)>
    where
        F: Fn(&Order) -> Result<TransitionPlan, AppError>,
    {
        for _ in 0..TRANSITION_ATTEMPTS {
            let (record, current) = self.load(id).await?;
            let next = plan(&current)?;
            let patch = OrderStatusPatch {
                order_status: next.order_status,
                payment_status: next.payment_status,
                payment_details: payment_details.clone(),
                updated_at: now_millis(),
            };
            let from = (current.order_status, current.payment_status);
            if let Some(updated) = self.orders.apply_status_from(&record, from, patch).await? {
                return Ok((current, updated));
            }
            tracing::debug!(order_id = %record, "Order changed during status update, re-planning");
        }
        Err(AppError::database("Order is busy, try again"))
    }

    pub async fn update_order_status(&self, id: &str, target: OrderStatus) -> AppResult<Order> {
        let (before, updated) = self
            .commit_transition(
                id,
                |order| Ok(transition::order_status(OrderState::from(order), target)?),
                None,
            )
            .await?;
        tracing::info!(
            order_id = %id,
            from = %before.order_status,
            to = %updated.order_status,
            payment = %updated.payment_status,
            "Order status updated"
        );
        Ok(updated)
    }

    pub async fn update_payment_status(
        &self,
        id: &str,
        target: PaymentStatus,
    ) -> AppResult<Order> {
        let (before, updated) = self
            .commit_transition(
                id,
                |order| Ok(transition::payment_status(OrderState::from(order), target)?),
                None,
            )
            .await?;
        tracing::info!(
            order_id = %id,
            from = %before.payment_status,
            to = %updated.payment_status,
            "Payment status updated"
        );
        Ok(updated)
    }

    /// Confirm an online payment with its gateway
    ///
    /// Nothing is written unless the gateway accepts the payment. The
    /// gateway call runs outside the write; the transition is re-checked
    /// against the order as stored when the result is committed.
    pub async fn verify_payment(&self, input: PaymentVerification) -> AppResult<Order> {
        let (record, order) = self.load(&input.order_id).await?;

        if !order.payment_method.is_online() {
            return Err(AppError::new(ErrorCode::PaymentMethodNotOnline));
        }
        transition::payment_verified(OrderState::from(&order))?;

        let gateway = self.gateways.get(order.payment_method)?;
        let verified = gateway.verify(&order, &input.claim).await.map_err(|e| {
            tracing::warn!(order_id = %record, error = %e, "Payment verification failed");
            AppError::from(e)
        })?;

        let details = PaymentDetails {
            gateway: order.payment_method,
            transaction_id: verified.transaction_id,
            amount: verified.amount,
            paid_at: now_millis(),
        };
        let (_, updated) = self
            .commit_transition(
                &input.order_id,
                |current| Ok(transition::payment_verified(OrderState::from(current))?),
                Some(details),
            )
            .await?;
        tracing::info!(
            order_id = %record,
            method = %order.payment_method,
            "Online payment verified"
        );
        Ok(updated)
    }

    /// Orders placed with `email`; 404 when there are none
    pub async fn find_by_email(&self, email: &str) -> AppResult<Vec<Order>> {
        let orders = self.orders.find_by_email(email).await?;
        if orders.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("No orders found for {}", email),
            ));
        }
        Ok(orders)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_all().await?)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Order> {
        self.load(id).await.map(|(_, order)| order)
    }
}
