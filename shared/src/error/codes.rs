//! Unified error codes for the BookHaul API
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Catalog errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Review errors
//! - 7xxx: Chat errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the storefront can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Uploaded file is not a supported image
    InvalidImage = 10,
    /// Uploaded file exceeds the size limit
    FileTooLarge = 11,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Admins cannot delete or demote themselves
    CannotModifySelf = 2004,
    /// Caller is not a participant of the chat
    NotParticipant = 2005,

    // ==================== 3xxx: Catalog ====================
    /// Book not found
    BookNotFound = 3001,
    /// Category is not one of the supported values
    InvalidCategory = 3002,
    /// Price is missing, negative or not a number
    InvalidPrice = 3003,
    /// Requested quantity exceeds stock
    OutOfStock = 3004,
    /// Quantity is zero, negative or not a number
    InvalidQuantity = 3005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is Delivered or Cancelled
    OrderTerminal = 4002,
    /// Online order has not been paid
    OrderNotPaid = 4003,
    /// Online order must be shipped before delivery
    OrderNotShipped = 4004,
    /// Order has no items
    OrderEmpty = 4005,
    /// COD order cannot be delivered while payment is pending
    PaymentPending = 4007,

    // ==================== 5xxx: Payment ====================
    /// Payment is already completed
    PaymentAlreadyCompleted = 5001,
    /// Payment status change is not allowed
    InvalidPaymentTransition = 5002,
    /// Claimed amount does not match the order total
    PaymentAmountMismatch = 5003,
    /// Gateway rejected the payment
    PaymentVerificationFailed = 5004,
    /// Order does not use an online payment method
    PaymentMethodNotOnline = 5005,
    /// Gateway could not be reached
    GatewayUnavailable = 5006,

    // ==================== 6xxx: Review ====================
    /// Review not found
    ReviewNotFound = 6001,
    /// Caller has no delivered order containing the book
    ReviewNotEligible = 6002,
    /// Caller already reviewed the book
    ReviewAlreadyExists = 6003,
    /// More than the allowed number of review images
    TooManyImages = 6004,

    // ==================== 7xxx: Chat ====================
    /// Chat not found
    ChatNotFound = 7001,
    /// Message has neither text nor image
    EmptyMessage = 7002,
    /// No seller account is configured
    SellerNotConfigured = 7003,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Email is already registered
    EmailExists = 8002,
    /// Username is already taken
    UsernameExists = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Storing an upload failed
    UploadFailed = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::InvalidImage => "File is not a supported image",
            ErrorCode::FileTooLarge => "File is too large",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifySelf => "Cannot perform this action on your own account",
            ErrorCode::NotParticipant => "Not a participant of this chat",

            // Catalog
            ErrorCode::BookNotFound => "Book not found",
            ErrorCode::InvalidCategory => "Invalid category",
            ErrorCode::InvalidPrice => "Invalid price",
            ErrorCode::OutOfStock => "Some items are out of stock",
            ErrorCode::InvalidQuantity => "Invalid quantity",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderTerminal => "Order status can no longer be changed",
            ErrorCode::OrderNotPaid => "Online orders must be paid first",
            ErrorCode::OrderNotShipped => "Order must be shipped first",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::PaymentPending => "Complete payment first",

            // Payment
            ErrorCode::PaymentAlreadyCompleted => "Payment is already completed",
            ErrorCode::InvalidPaymentTransition => "Payment status change is not allowed",
            ErrorCode::PaymentAmountMismatch => "Payment amount mismatch",
            ErrorCode::PaymentVerificationFailed => "Payment verification failed",
            ErrorCode::PaymentMethodNotOnline => "Order does not use online payment",
            ErrorCode::GatewayUnavailable => "Payment gateway is unavailable",

            // Review
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::ReviewNotEligible => "Only customers with a delivered order can review",
            ErrorCode::ReviewAlreadyExists => "You have already reviewed this book",
            ErrorCode::TooManyImages => "Too many images",

            // Chat
            ErrorCode::ChatNotFound => "Chat not found",
            ErrorCode::EmptyMessage => "Message must have text or an image",
            ErrorCode::SellerNotConfigured => "Seller account not configured",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::UsernameExists => "Username already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::UploadFailed => "Upload failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            10 => Ok(ErrorCode::InvalidImage),
            11 => Ok(ErrorCode::FileTooLarge),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotModifySelf),
            2005 => Ok(ErrorCode::NotParticipant),

            // Catalog
            3001 => Ok(ErrorCode::BookNotFound),
            3002 => Ok(ErrorCode::InvalidCategory),
            3003 => Ok(ErrorCode::InvalidPrice),
            3004 => Ok(ErrorCode::OutOfStock),
            3005 => Ok(ErrorCode::InvalidQuantity),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderTerminal),
            4003 => Ok(ErrorCode::OrderNotPaid),
            4004 => Ok(ErrorCode::OrderNotShipped),
            4005 => Ok(ErrorCode::OrderEmpty),
            4007 => Ok(ErrorCode::PaymentPending),

            // Payment
            5001 => Ok(ErrorCode::PaymentAlreadyCompleted),
            5002 => Ok(ErrorCode::InvalidPaymentTransition),
            5003 => Ok(ErrorCode::PaymentAmountMismatch),
            5004 => Ok(ErrorCode::PaymentVerificationFailed),
            5005 => Ok(ErrorCode::PaymentMethodNotOnline),
            5006 => Ok(ErrorCode::GatewayUnavailable),

            // Review
            6001 => Ok(ErrorCode::ReviewNotFound),
            6002 => Ok(ErrorCode::ReviewNotEligible),
            6003 => Ok(ErrorCode::ReviewAlreadyExists),
            6004 => Ok(ErrorCode::TooManyImages),

            // Chat
            7001 => Ok(ErrorCode::ChatNotFound),
            7002 => Ok(ErrorCode::EmptyMessage),
            7003 => Ok(ErrorCode::SellerNotConfigured),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::EmailExists),
            8003 => Ok(ErrorCode::UsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::UploadFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidFormat,
        ErrorCode::RequiredField,
        ErrorCode::ValueOutOfRange,
        ErrorCode::InvalidImage,
        ErrorCode::FileTooLarge,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::PermissionDenied,
        ErrorCode::AdminRequired,
        ErrorCode::CannotModifySelf,
        ErrorCode::NotParticipant,
        ErrorCode::BookNotFound,
        ErrorCode::InvalidCategory,
        ErrorCode::InvalidPrice,
        ErrorCode::OutOfStock,
        ErrorCode::InvalidQuantity,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderTerminal,
        ErrorCode::OrderNotPaid,
        ErrorCode::OrderNotShipped,
        ErrorCode::OrderEmpty,
        ErrorCode::PaymentPending,
        ErrorCode::PaymentAlreadyCompleted,
        ErrorCode::InvalidPaymentTransition,
        ErrorCode::PaymentAmountMismatch,
        ErrorCode::PaymentVerificationFailed,
        ErrorCode::PaymentMethodNotOnline,
        ErrorCode::GatewayUnavailable,
        ErrorCode::ReviewNotFound,
        ErrorCode::ReviewNotEligible,
        ErrorCode::ReviewAlreadyExists,
        ErrorCode::TooManyImages,
        ErrorCode::ChatNotFound,
        ErrorCode::EmptyMessage,
        ErrorCode::SellerNotConfigured,
        ErrorCode::UserNotFound,
        ErrorCode::EmailExists,
        ErrorCode::UsernameExists,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::ConfigError,
        ErrorCode::UploadFailed,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::OutOfStock.code(), 3004);
        assert_eq!(ErrorCode::OrderTerminal.code(), 4002);
        assert_eq!(ErrorCode::GatewayUnavailable.code(), 5006);
        assert_eq!(ErrorCode::ReviewAlreadyExists.code(), 6003);
        assert_eq!(ErrorCode::EmptyMessage.code(), 7002);
        assert_eq!(ErrorCode::EmailExists.code(), 8002);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_covers_every_code() {
        for code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(9), Err(InvalidErrorCode(9)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("6002").unwrap();
        assert_eq!(code, ErrorCode::ReviewNotEligible);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::ChatNotFound.to_string(), "7001");
        assert_eq!(
            InvalidErrorCode(42).to_string(),
            "Invalid error code: 42"
        );
    }

    #[test]
    fn test_message_is_never_empty() {
        for code in ALL {
            assert!(!code.message().is_empty(), "{code:?} has no message");
        }
    }
}
