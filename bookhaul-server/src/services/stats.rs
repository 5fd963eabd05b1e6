//! Admin dashboard statistics
//!
//! Read-only rollups over orders and books.

use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::order::SalesRow;
use crate::db::repository::{BookRepository, OrderRepository};
use crate::orders::money::{to_decimal, to_f64};
use crate::utils::AppResult;
use crate::utils::time::month_of;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    /// 1-12
    pub month: u32,
    pub total_sales: f64,
    pub total_orders: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_orders: i64,
    pub total_sales: f64,
    pub trending_books: i64,
    pub total_books: i64,
    pub monthly_sales: Vec<MonthlySales>,
}

/// Group sales by UTC calendar month, always twelve entries
pub fn monthly_rollup(rows: &[SalesRow]) -> Vec<MonthlySales> {
    let mut sales = [Decimal::ZERO; 12];
    let mut counts = [0i64; 12];

    for row in rows {
        let Some(month) = month_of(row.created_at) else {
            tracing::warn!(created_at = row.created_at, "Order with invalid timestamp skipped");
            continue;
        };
        let slot = (month - 1) as usize;
        sales[slot] += to_decimal(row.total_price);
        counts[slot] += 1;
    }

    (0..12)
        .map(|i| MonthlySales {
            month: i as u32 + 1,
            total_sales: to_f64(sales[i]),
            total_orders: counts[i],
        })
        .collect()
}

#[derive(Clone)]
pub struct StatsService {
    books: BookRepository,
    orders: OrderRepository,
}

impl StatsService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            books: BookRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    pub async fn admin_stats(&self) -> AppResult<AdminStats> {
        let rows = self.orders.sales_rows().await?;
        let total_sales: Decimal = rows.iter().map(|r| to_decimal(r.total_price)).sum();

        Ok(AdminStats {
            total_orders: rows.len() as i64,
            total_sales: to_f64(total_sales),
            trending_books: self.books.count_trending().await?,
            total_books: self.books.count().await?,
            monthly_sales: monthly_rollup(&rows),
        })
    }
}
