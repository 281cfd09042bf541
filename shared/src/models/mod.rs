//! Domain models
//!
//! Entity rows, create/update payloads and response shapes for the
//! marketplace domain. Database derives are feature-gated behind `db` so
//! clients can use these types without pulling in sqlx.

pub mod account;
pub mod offer;
pub mod order;
pub mod review;
pub mod role;
pub mod stats;

pub use account::{UserAccount, UserPublic};
pub use offer::{
    DetailRef, Offer, OfferCreate, OfferDetail, OfferDetailCreate, OfferDetailUpdate, OfferItem,
    OfferStatus, OfferType, OfferUpdate,
};
pub use order::{Order, OrderCreate, OrderStatus, OrderStatusUpdate};
pub use review::{RATING_MAX, RATING_MIN, Review, ReviewCreate, ReviewUpdate};
pub use role::Role;
pub use stats::BaseInfo;

use serde::{Deserialize, Serialize};

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of matching rows (before pagination)
    pub count: i64,
    pub results: Vec<T>,
}
