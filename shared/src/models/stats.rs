//! Platform statistics

use serde::{Deserialize, Serialize};

/// Public platform-wide counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseInfo {
    pub review_count: i64,
    /// Mean of all review ratings, rounded to one decimal place; 0.0 when
    /// no reviews exist
    pub average_rating: f64,
    pub business_profile_count: i64,
    pub offer_count: i64,
}
