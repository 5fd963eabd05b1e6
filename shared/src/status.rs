//! Order lifecycle enums
//!
//! The wire spelling of every variant is the storefront's spelling
//! (`"COD"`, `"eSewa"`, `"Pending"`, ...). Unknown strings fail to
//! deserialize, so handlers never see an unrecognised status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fulfilment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Delivered and Cancelled orders never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::Completed,
        PaymentStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    Khalti,
    #[serde(rename = "eSewa")]
    ESewa,
}

impl PaymentMethod {
    /// Online methods must be paid before fulfilment starts
    pub fn is_online(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Khalti => "Khalti",
            PaymentMethod::ESewa => "eSewa",
        }
    }
}

/// Error returned when parsing an unknown enum spelling
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! impl_str_conversions {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

impl_str_conversions!(OrderStatus, "order status", [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
]);
impl_str_conversions!(PaymentStatus, "payment status", [
    PaymentStatus::Pending,
    PaymentStatus::Completed,
    PaymentStatus::Failed,
]);
impl_str_conversions!(PaymentMethod, "payment method", [
    PaymentMethod::Cod,
    PaymentMethod::Khalti,
    PaymentMethod::ESewa,
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(OrderStatus::is_terminal)
            .collect();
        assert_eq!(terminal, vec![OrderStatus::Delivered, OrderStatus::Cancelled]);
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
        assert_eq!(serde_json::to_string(&PaymentMethod::ESewa).unwrap(), "\"eSewa\"");
        let m: PaymentMethod = serde_json::from_str("\"Khalti\"").unwrap();
        assert_eq!(m, PaymentMethod::Khalti);
        assert!(serde_json::from_str::<PaymentMethod>("\"cod\"").is_err());
    }

    #[test]
    fn test_online_methods() {
        assert!(!PaymentMethod::Cod.is_online());
        assert!(PaymentMethod::Khalti.is_online());
        assert!(PaymentMethod::ESewa.is_online());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_str::<OrderStatus>("\"Confirmed\"").is_err());
        assert!(serde_json::from_str::<PaymentStatus>("\"Paid\"").is_err());
        let err = "Paid".parse::<PaymentStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid payment status: Paid");
    }

    #[test]
    fn test_display_matches_serde() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        for status in PaymentStatus::ALL {
            assert_eq!(status.to_string().parse::<PaymentStatus>().unwrap(), status);
        }
    }
}
