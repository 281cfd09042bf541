//! HTTP status mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Map this error code to the HTTP status it should surface as.
    ///
    /// Duplicate reviews intentionally map to 400 (not 409): the published
    /// API treats "already reviewed" as a validation failure.
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OfferNotFound
            | Self::OfferDetailNotFound
            | Self::OrderNotFound
            | Self::ReviewNotFound
            | Self::AccountNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::OrderAlreadyFinal => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired | Self::AdminRequired => {
                StatusCode::FORBIDDEN
            }

            // 400 Bad Request
            Self::Unknown
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::TierCountInvalid
            | Self::TierSetInvalid
            | Self::FeaturesEmpty
            | Self::OfferDetailInvalid
            | Self::AlreadyReviewed
            | Self::RatingOutOfRange
            | Self::TargetNotBusiness
            | Self::UsernameExists => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
