//! Online payment verification
//!
//! One [`PaymentGateway`] per online method. [`PaymentGateways`] is the
//! registry the order service looks gateways up in, so tests can swap
//! the network-backed Khalti gateway for a stub.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shared::{AppError, ErrorCode, PaymentMethod};
use thiserror::Error;

use crate::core::config::KhaltiConfig;
use crate::db::models::Order;
use crate::orders::money::{amounts_match, to_paisa};

/// What the storefront claims was paid
#[derive(Debug, Clone)]
pub struct PaymentClaim {
    pub token: Option<String>,
    pub transaction_id: Option<String>,
    /// Rupees for eSewa, paisa for Khalti
    pub amount: f64,
}

/// Gateway-confirmed payment
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayment {
    pub transaction_id: String,
    /// Rupees
    pub amount: f64,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Payment verification failed: {0}")]
    Rejected(String),

    #[error("Payment amount mismatch: expected {expected}, got {actual}")]
    AmountMismatch { expected: String, actual: String },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("No gateway configured for {0}")]
    NotConfigured(PaymentMethod),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let code = match &err {
            GatewayError::Unavailable(_) | GatewayError::NotConfigured(_) => {
                ErrorCode::GatewayUnavailable
            }
            GatewayError::Rejected(_) => ErrorCode::PaymentVerificationFailed,
            GatewayError::AmountMismatch { .. } => ErrorCode::PaymentAmountMismatch,
            GatewayError::MissingField(_) => ErrorCode::RequiredField,
        };
        AppError::upstream(code, err.to_string())
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn method(&self) -> PaymentMethod;

    /// Confirm that `claim` pays for `order`
    async fn verify(&self, order: &Order, claim: &PaymentClaim)
    -> Result<VerifiedPayment, GatewayError>;
}

// =============================================================================
// Khalti
// =============================================================================

/// Verifies tokens against Khalti's server-side verify endpoint
pub struct KhaltiGateway {
    client: reqwest::Client,
    secret_key: Option<String>,
    verify_url: String,
}

#[derive(Debug, Deserialize)]
struct KhaltiVerifyResponse {
    idx: String,
    /// Paisa
    amount: i64,
}

impl KhaltiGateway {
    pub fn new(config: &KhaltiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            verify_url: config.verify_url.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for KhaltiGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Khalti
    }

    async fn verify(
        &self,
        order: &Order,
        claim: &PaymentClaim,
    ) -> Result<VerifiedPayment, GatewayError> {
        let secret = self
            .secret_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured(PaymentMethod::Khalti))?;
        let token = claim
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GatewayError::MissingField("token"))?;

        let expected = to_paisa(order.total_price);
        if claim.amount.fract() != 0.0 || claim.amount as i64 != expected {
            return Err(GatewayError::AmountMismatch {
                expected: expected.to_string(),
                actual: claim.amount.to_string(),
            });
        }

        let resp = self
            .client
            .post(&self.verify_url)
            .header(reqwest::header::AUTHORIZATION, format!("Key {}", secret))
            .json(&json!({
                "token": token,
                "amount": expected,
            }))
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if resp.status().is_server_error() {
            return Err(GatewayError::Unavailable(format!("Khalti returned {}", resp.status())));
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(order_id = %order.id_string(), %status, body = %text, "Khalti rejected payment");
            return Err(GatewayError::Rejected(format!("Khalti returned {}", status)));
        }

        let body: KhaltiVerifyResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("Invalid Khalti response: {}", e)))?;

        if body.amount != expected {
            return Err(GatewayError::AmountMismatch {
                expected: expected.to_string(),
                actual: body.amount.to_string(),
            });
        }

        Ok(VerifiedPayment {
            transaction_id: body.idx,
            amount: order.total_price,
        })
    }
}

// =============================================================================
// eSewa
// =============================================================================

/// Checks the claimed amount against the order; eSewa confirms on redirect
pub struct EsewaGateway;

#[async_trait]
impl PaymentGateway for EsewaGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::ESewa
    }

    async fn verify(
        &self,
        order: &Order,
        claim: &PaymentClaim,
    ) -> Result<VerifiedPayment, GatewayError> {
        if !amounts_match(claim.amount, order.total_price) {
            return Err(GatewayError::AmountMismatch {
                expected: format!("{:.2}", order.total_price),
                actual: format!("{:.2}", claim.amount),
            });
        }
        let transaction_id = claim
            .transaction_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::MissingField("transactionId"))?;

        Ok(VerifiedPayment {
            transaction_id: transaction_id.to_string(),
            amount: order.total_price,
        })
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Clone, Default)]
pub struct PaymentGateways {
    gateways: HashMap<PaymentMethod, Arc<dyn PaymentGateway>>,
}

impl PaymentGateways {
    /// Khalti (network) and eSewa (local) gateways
    pub fn from_config(khalti: &KhaltiConfig) -> Self {
        Self::default()
            .with(Arc::new(KhaltiGateway::new(khalti)))
            .with(Arc::new(EsewaGateway))
    }

    /// Register or replace the gateway for its method
    pub fn with(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateways.insert(gateway.method(), gateway);
        self
    }

    pub fn get(&self, method: PaymentMethod) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        self.gateways
            .get(&method)
            .cloned()
            .ok_or(GatewayError::NotConfigured(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Address;
    use shared::{OrderStatus, PaymentStatus};

    fn order(method: PaymentMethod, total: f64) -> Order {
        Order {
            id: None,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "9800000000".into(),
            address: Address {
                city: "Kathmandu".into(),
                country: "Nepal".into(),
                state: "Bagmati".into(),
                zipcode: "44600".into(),
            },
            items: Vec::new(),
            total_price: total,
            payment_method: method,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            payment_details: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn claim(amount: f64, transaction_id: Option<&str>) -> PaymentClaim {
        PaymentClaim {
            token: None,
            transaction_id: transaction_id.map(String::from),
            amount,
        }
    }

    #[tokio::test]
    async fn test_esewa_accepts_matching_amount() {
        let order = order(PaymentMethod::ESewa, 40.28);
        let paid = EsewaGateway
            .verify(&order, &claim(40.28, Some("TXN-1")))
            .await
            .unwrap();
        assert_eq!(paid.transaction_id, "TXN-1");
        assert_eq!(paid.amount, 40.28);
    }

    #[tokio::test]
    async fn test_esewa_rejects_mismatch_and_missing_id() {
        let order = order(PaymentMethod::ESewa, 40.28);
        let err = EsewaGateway
            .verify(&order, &claim(40.0, Some("TXN-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::AmountMismatch { .. }));

        let err = EsewaGateway
            .verify(&order, &claim(40.28, Some("  ")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingField("transactionId")));
    }

    #[tokio::test]
    async fn test_khalti_without_secret_is_unavailable() {
        let gateway = KhaltiGateway::new(&KhaltiConfig {
            secret_key: None,
            verify_url: "http://127.0.0.1:9/verify".into(),
        });
        let order = order(PaymentMethod::Khalti, 100.0);
        let mut c = claim(10_000.0, None);
        c.token = Some("tok".into());
        let err = gateway.verify(&order, &c).await.unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::GatewayUnavailable);
    }

    #[tokio::test]
    async fn test_khalti_checks_paisa_before_calling_out() {
        let gateway = KhaltiGateway::new(&KhaltiConfig {
            secret_key: Some("test_secret".into()),
            verify_url: "http://127.0.0.1:9/verify".into(),
        });
        let order = order(PaymentMethod::Khalti, 100.0);
        let mut c = claim(100.0, None);
        c.token = Some("tok".into());
        let err = gateway.verify(&order, &c).await.unwrap_err();
        assert!(matches!(err, GatewayError::AmountMismatch { .. }));
    }

    #[test]
    fn test_registry_lookup() {
        let gateways = PaymentGateways::default().with(Arc::new(EsewaGateway));
        assert!(gateways.get(PaymentMethod::ESewa).is_ok());
        assert!(matches!(
            gateways.get(PaymentMethod::Khalti),
            Err(GatewayError::NotConfigured(PaymentMethod::Khalti))
        ));
    }
}
