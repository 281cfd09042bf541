//! Account roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role attached to an account
///
/// Business accounts publish offers and fulfil orders; customer accounts
/// place orders and write reviews. Staff status is orthogonal and lives on
/// the account itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Role {
    Business,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Business => "business",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(Role::Business),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
