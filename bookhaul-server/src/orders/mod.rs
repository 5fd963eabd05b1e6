//! Order lifecycle
//!
//! - **manager**: [`OrderService`], creation with stock reservation and
//!   every status write
//! - **transition**: pure order/payment state machine
//! - **payment**: online gateway verification (Khalti, eSewa)
//! - **money**: Decimal arithmetic for totals
//!
//! # Architecture
//!
//! ```text
//! Handler → OrderService → transition (plan) → OrderRepository (merge)
//!                ↓
//!         BookRepository (conditional stock update)
//! ```

pub mod manager;
pub mod money;
pub mod payment;
pub mod transition;

pub use manager::{NewOrder, OrderLine, OrderService, PaymentVerification, UnavailableItem};
pub use payment::{
    EsewaGateway, GatewayError, KhaltiGateway, PaymentClaim, PaymentGateway, PaymentGateways,
    VerifiedPayment,
};
pub use transition::{OrderState, TransitionError, TransitionPlan};
