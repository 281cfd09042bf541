//! Review model

use serde::{Deserialize, Serialize};

/// Accepted rating bounds (inclusive)
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// Review entity
///
/// At most one review exists per (business_user, reviewer) pair; the pair
/// is unique in storage so concurrent creates cannot race past the check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    #[serde(rename = "business_user")]
    pub business_user_id: i64,
    #[serde(rename = "reviewer")]
    pub reviewer_id: i64,
    pub rating: i64,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create payload; the reviewer is always the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    #[serde(rename = "business_user")]
    pub business_user_id: i64,
    pub rating: i64,
    pub description: String,
}

/// Partial update payload; only rating and description are mutable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<i64>,
    pub description: Option<String>,
}
