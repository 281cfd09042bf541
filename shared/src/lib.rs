//! Shared types for the marketplace backend.
//!
//! This crate holds everything both the server and its tests agree on:
//!
//! - [`error`]: unified error codes, [`AppError`](error::AppError) and the
//!   [`ApiResponse`](error::ApiResponse) envelope
//! - [`models`]: offer, order, review and account models plus their
//!   create/update payloads
//! - [`util`]: timestamp and ID helpers

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{OfferStatus, OfferType, OrderStatus, Role};
