//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::{OrderStatus, PaymentMethod, PaymentStatus};
use validator::Validate;

use crate::api::ValidJson;
use crate::core::ServerState;
use crate::db::models::{Address, Order, serde_helpers};
use crate::orders::manager::{NewOrder, OrderLine, PaymentVerification};
use crate::orders::payment::PaymentClaim;
use crate::utils::validation::trimmed;
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressInput {
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, max = 100, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, max = 20, message = "Zipcode is required"))]
    pub zipcode: String,
}

impl From<AddressInput> for Address {
    fn from(input: AddressInput) -> Self {
        Self {
            city: input.city.trim().to_string(),
            country: input.country.trim().to_string(),
            state: input.state.trim().to_string(),
            zipcode: input.zipcode.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderLineInput {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    pub quantity: i64,
}

/// Checkout body
///
/// `totalPrice` is accepted for compatibility with older storefronts and
/// ignored; the total is always computed from current book prices.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, max = 32, message = "Phone is required"))]
    pub phone: String,
    #[validate(nested)]
    pub address: AddressInput,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    #[validate(nested)]
    pub items: Vec<OrderLineInput>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub total_price: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderStatusRequest {
    pub order_status: OrderStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, message = "orderId is required"))]
    pub order_id: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_f64")]
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct OrderMessage {
    pub message: &'static str,
    pub order: Order,
}

/// Place an order
pub async fn create(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<CreateOrderRequest>,
) -> AppResult<Json<Order>> {
    if req.total_price.is_some() {
        tracing::debug!("Ignoring client-supplied totalPrice");
    }

    let input = NewOrder {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: req.phone.trim().to_string(),
        address: req.address.into(),
        items: req
            .items
            .into_iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        payment_method: req.payment_method,
    };

    Ok(Json(state.orders.create_order(input).await?))
}

/// Orders placed with an email, newest first
pub async fn list_by_email(
    State(state): State<ServerState>,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.find_by_email(email.trim()).await?))
}

/// All orders (admin)
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.find_all().await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.find_by_id(&id).await?))
}

/// Move the order through its lifecycle (admin)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<OrderStatusRequest>,
) -> AppResult<Json<OrderMessage>> {
    let order = state.orders.update_order_status(&id, req.order_status).await?;
    Ok(Json(OrderMessage {
        message: "Order status updated successfully",
        order,
    }))
}

/// Change the payment status by hand (admin)
pub async fn update_payment_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<PaymentStatusRequest>,
) -> AppResult<Json<OrderMessage>> {
    let order = state
        .orders
        .update_payment_status(&id, req.payment_status)
        .await?;
    Ok(Json(OrderMessage {
        message: "Payment status updated successfully",
        order,
    }))
}

/// Confirm an online payment with its gateway
pub async fn verify_payment(
    State(state): State<ServerState>,
    ValidJson(req): ValidJson<VerifyPaymentRequest>,
) -> AppResult<Json<OrderMessage>> {
    let amount = req.amount.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "amount is required")
            .with_detail("field", "amount")
    })?;

    let verification = PaymentVerification {
        order_id: req.order_id,
        claim: PaymentClaim {
            token: trimmed(req.token.as_deref()),
            transaction_id: trimmed(req.transaction_id.as_deref()),
            amount,
        },
    };

    let order = state.orders.verify_payment(verification).await?;
    Ok(Json(OrderMessage {
        message: "Payment verified successfully",
        order,
    }))
}
