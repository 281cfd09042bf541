//! Repository Module
//!
//! CRUD and query operations over the SQLite store, one repository per
//! aggregate. Repositories speak [`RepoError`]; the API layer converts to
//! `AppError` at the boundary.

pub mod offer;
pub mod order;
pub mod review;
pub mod stats;
pub mod user;

pub use offer::OfferRepository;
pub use order::OrderRepository;
pub use review::ReviewRepository;
pub use stats::StatsRepository;
pub use user::UserRepository;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
