//! Offer and offer detail models

use super::account::UserPublic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three fixed pricing tiers of an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OfferType {
    Basic,
    Standard,
    Premium,
}

impl OfferType {
    pub const ALL: [OfferType; 3] = [OfferType::Basic, OfferType::Standard, OfferType::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Basic => "basic",
            OfferType::Standard => "standard",
            OfferType::Premium => "premium",
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(OfferType::Basic),
            "standard" => Ok(OfferType::Standard),
            "premium" => Ok(OfferType::Premium),
            other => Err(format!("unknown offer type: {other}")),
        }
    }
}

/// Offer lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OfferStatus {
    InProgress,
    Completed,
    Cancelled,
}

/// Offer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Offer {
    pub id: i64,
    /// Owning business account
    pub user_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub status: OfferStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Offer detail tier entity
///
/// Exactly one row per `offer_type` exists for each offer; the pair is
/// unique in storage and tiers are never added or removed after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OfferDetail {
    pub id: i64,
    pub offer_id: i64,
    pub title: String,
    /// -1 denotes unlimited revisions
    pub revisions: i64,
    pub delivery_time_in_days: i64,
    /// Price in cents
    pub price: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

/// Create payload for one detail tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferDetailCreate {
    pub title: String,
    pub revisions: i64,
    pub delivery_time_in_days: i64,
    /// Price in cents
    pub price: i64,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

/// Create offer payload: header fields plus exactly three tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCreate {
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub details: Vec<OfferDetailCreate>,
}

/// Update payload for one tier, matched to the stored row by `offer_type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferDetailUpdate {
    /// Merge key; entries whose type has no stored counterpart are ignored
    pub offer_type: OfferType,
    pub title: Option<String>,
    pub revisions: Option<i64>,
    pub delivery_time_in_days: Option<i64>,
    pub price: Option<i64>,
    pub features: Option<Vec<String>>,
}

/// Partial update payload for an offer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferUpdate {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub status: Option<OfferStatus>,
    pub details: Option<Vec<OfferDetailUpdate>>,
}

/// Addressable reference to one tier, nested in offer representations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRef {
    pub id: i64,
    pub url: String,
}

impl DetailRef {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            url: format!("/offerdetails/{id}/"),
        }
    }
}

/// Offer representation returned by list and retrieve endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferItem {
    pub id: i64,
    pub user: i64,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub status: OfferStatus,
    pub created_at: i64,
    pub updated_at: i64,
    pub details: Vec<DetailRef>,
    /// Minimum tier price in cents; null when no tiers exist
    pub min_price: Option<i64>,
    pub min_delivery_time: Option<i64>,
    /// Owner info, only present on list items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserPublic>,
}
