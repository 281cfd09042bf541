//! Account model

use super::role::Role;
use serde::{Deserialize, Serialize};

/// Account entity
///
/// Backs the identity directory: every caller resolves to one of these, and
/// the `role` column is what the capability checks run against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string, never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// Staff accounts may mutate any offer and delete orders
    pub is_staff: bool,
    pub created_at: i64,
}

/// Public slice of an account, embedded in offer list items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl From<&UserAccount> for UserPublic {
    fn from(user: &UserAccount) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}
