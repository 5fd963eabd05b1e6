//! Order Model

use serde::{Deserialize, Serialize};
use shared::{OrderStatus, PaymentMethod, PaymentStatus};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub city: String,
    pub country: String,
    pub state: String,
    pub zipcode: String,
}

/// One purchased line, priced at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// "book:key"
    pub product_id: String,
    pub title: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// Recorded after a gateway confirms an online payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub gateway: PaymentMethod,
    pub transaction_id: String,
    pub amount: f64,
    pub paid_at: i64,
}

/// Customer order
///
/// After creation only `payment_status`, `order_status` and
/// `payment_details` change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    pub fn contains_book(&self, book_id: &str) -> bool {
        self.items.iter().any(|i| i.product_id == book_id)
    }
}
