//! Order model

use super::offer::OfferType;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// `in_progress` is the initial state; `completed` and `cancelled` are
/// terminal and cannot be left once entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states cannot transition anywhere else
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Order entity
///
/// Everything except `status` and `updated_at` is an immutable snapshot
/// taken at creation time: the tier fields are copied by value from the
/// source offer detail so later catalog edits never alter existing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    #[serde(rename = "customer_user")]
    pub customer_user_id: i64,
    /// Derived from the source tier's offer owner at creation
    #[serde(rename = "business_user")]
    pub business_user_id: i64,
    pub title: String,
    pub revisions: i64,
    pub delivery_time_in_days: i64,
    /// Price in cents
    pub price: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub features: Vec<String>,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create payload: the tier the customer is ordering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub offer_detail_id: i64,
}

/// Status update payload; the only mutable order field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
