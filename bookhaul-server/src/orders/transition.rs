//! Order and payment status transitions
//!
//! Pure functions over the status enums. Handlers never write a status
//! directly; they ask for a [`TransitionPlan`] and persist it.
//!
//! # Order status guards (first violation wins)
//!
//! 1. Delivered and Cancelled are final
//! 2. COD: Delivered needs a Completed payment
//! 3. Online: any change needs a Completed payment
//! 4. Online: Delivered needs Shipped
//!
//! # Payment status
//!
//! | Method | Allowed |
//! |--------|---------|
//! | COD | Pending/Failed -> Completed |
//! | Online | Pending <-> Failed, Pending/Failed -> Completed |
//!
//! Completed is final for both, and nothing changes on a cancelled order.

use shared::{AppError, ErrorCode, OrderStatus, PaymentMethod, PaymentStatus};
use thiserror::Error;

use crate::db::models::Order;

/// Status fields the transition rules look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderState {
    pub payment_method: PaymentMethod,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl From<&Order> for OrderState {
    fn from(order: &Order) -> Self {
        Self {
            payment_method: order.payment_method,
            order_status: order.order_status,
            payment_status: order.payment_status,
        }
    }
}

/// Statuses to persist after an accepted transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Order status cannot be changed from {0}")]
    Terminal(OrderStatus),

    #[error("Complete payment first before marking a COD order as Delivered")]
    CodPaymentPending,

    #[error("Online orders must be paid first")]
    NotPaid,

    #[error("Order must be shipped first")]
    NotShipped,

    #[error("Payment is already completed")]
    PaymentAlreadyCompleted,

    #[error("COD payment can only be marked as Completed")]
    CodCompletedOnly,

    #[error("Payment status is already {0}")]
    Unchanged(PaymentStatus),

    #[error("Payment of a cancelled order cannot change")]
    OrderCancelled,
}

impl TransitionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TransitionError::Terminal(_) | TransitionError::OrderCancelled => {
                ErrorCode::OrderTerminal
            }
            TransitionError::CodPaymentPending => ErrorCode::PaymentPending,
            TransitionError::NotPaid => ErrorCode::OrderNotPaid,
            TransitionError::NotShipped => ErrorCode::OrderNotShipped,
            TransitionError::PaymentAlreadyCompleted => ErrorCode::PaymentAlreadyCompleted,
            TransitionError::CodCompletedOnly | TransitionError::Unchanged(_) => {
                ErrorCode::InvalidPaymentTransition
            }
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::conflict(err.code(), err.to_string())
    }
}

/// Plan an order status change
pub fn order_status(
    current: OrderState,
    target: OrderStatus,
) -> Result<TransitionPlan, TransitionError> {
    if current.order_status.is_terminal() {
        return Err(TransitionError::Terminal(current.order_status));
    }

    let mut payment_status = current.payment_status;

    if current.payment_method.is_online() {
        if current.payment_status != PaymentStatus::Completed {
            return Err(TransitionError::NotPaid);
        }
        if target == OrderStatus::Delivered && current.order_status != OrderStatus::Shipped {
            return Err(TransitionError::NotShipped);
        }
    } else if target == OrderStatus::Delivered {
        if current.payment_status != PaymentStatus::Completed {
            return Err(TransitionError::CodPaymentPending);
        }
        payment_status = PaymentStatus::Completed;
    }

    Ok(TransitionPlan {
        order_status: target,
        payment_status,
    })
}

/// Plan a payment status change
pub fn payment_status(
    current: OrderState,
    target: PaymentStatus,
) -> Result<TransitionPlan, TransitionError> {
    if current.order_status == OrderStatus::Cancelled {
        return Err(TransitionError::OrderCancelled);
    }
    if current.payment_status == PaymentStatus::Completed {
        return Err(TransitionError::PaymentAlreadyCompleted);
    }

    if !current.payment_method.is_online() && target != PaymentStatus::Completed {
        return Err(TransitionError::CodCompletedOnly);
    }
    if current.payment_status == target {
        return Err(TransitionError::Unchanged(target));
    }

    Ok(TransitionPlan {
        order_status: current.order_status,
        payment_status: target,
    })
}

/// Plan the effect of a verified online payment
pub fn payment_verified(current: OrderState) -> Result<TransitionPlan, TransitionError> {
    if current.order_status.is_terminal() {
        return Err(TransitionError::Terminal(current.order_status));
    }
    if current.payment_status == PaymentStatus::Completed {
        return Err(TransitionError::PaymentAlreadyCompleted);
    }
    Ok(TransitionPlan {
        order_status: OrderStatus::Processing,
        payment_status: PaymentStatus::Completed,
    })
}
