//! Unified error codes for the marketplace backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Offer errors
//! - 4xxx: Order errors
//! - 5xxx: Review errors
//! - 8xxx: Account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
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

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Administrator account required
    AdminRequired = 2003,

    // ==================== 3xxx: Offer ====================
    /// Offer not found
    OfferNotFound = 3001,
    /// Offer detail tier not found
    OfferDetailNotFound = 3002,
    /// Wrong number of detail tiers
    TierCountInvalid = 3003,
    /// Detail tiers are not exactly basic/standard/premium
    TierSetInvalid = 3004,
    /// A detail tier has an empty feature list
    FeaturesEmpty = 3005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is in a terminal status
    OrderAlreadyFinal = 4002,
    /// Referenced offer detail does not exist
    OfferDetailInvalid = 4003,

    // ==================== 5xxx: Review ====================
    /// Review not found
    ReviewNotFound = 5001,
    /// Reviewer has already reviewed this business user
    AlreadyReviewed = 5002,
    /// Rating outside the accepted 1-5 range
    RatingOutOfRange = 5003,
    /// Review target is not a business account
    TargetNotBusiness = 5004,

    // ==================== 8xxx: Account ====================
    /// Username is already taken
    UsernameExists = 8001,
    /// Account not found
    AccountNotFound = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
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

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator account is required",

            // Offer
            ErrorCode::OfferNotFound => "Offer not found",
            ErrorCode::OfferDetailNotFound => "Offer detail not found",
            ErrorCode::TierCountInvalid => "Exactly three offer details must be provided",
            ErrorCode::TierSetInvalid => {
                "Offer details must include one each of basic, standard, and premium"
            }
            ErrorCode::FeaturesEmpty => "Each offer detail must have at least one feature",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyFinal => "Order is already in a terminal status",
            ErrorCode::OfferDetailInvalid => "Invalid offer detail ID",

            // Review
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::AlreadyReviewed => "You have already reviewed this business user",
            ErrorCode::RatingOutOfRange => "Rating must be between 1 and 5",
            ErrorCode::TargetNotBusiness => "Reviews can only target business users",

            // Account
            ErrorCode::UsernameExists => "Username is already taken",
            ErrorCode::AccountNotFound => "Account not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not correspond to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        use ErrorCode::*;
        let code = match value {
            0 => Success,
            1 => Unknown,
            2 => ValidationFailed,
            3 => NotFound,
            4 => AlreadyExists,
            5 => InvalidRequest,
            6 => InvalidFormat,
            7 => RequiredField,
            8 => ValueOutOfRange,
            1001 => NotAuthenticated,
            1002 => InvalidCredentials,
            1003 => TokenExpired,
            1004 => TokenInvalid,
            2001 => PermissionDenied,
            2002 => RoleRequired,
            2003 => AdminRequired,
            3001 => OfferNotFound,
            3002 => OfferDetailNotFound,
            3003 => TierCountInvalid,
            3004 => TierSetInvalid,
            3005 => FeaturesEmpty,
            4001 => OrderNotFound,
            4002 => OrderAlreadyFinal,
            4003 => OfferDetailInvalid,
            5001 => ReviewNotFound,
            5002 => AlreadyReviewed,
            5003 => RatingOutOfRange,
            5004 => TargetNotBusiness,
            8001 => UsernameExists,
            8002 => AccountNotFound,
            9001 => InternalError,
            9002 => DatabaseError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
