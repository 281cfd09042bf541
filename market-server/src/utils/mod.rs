//! Utility Module

pub mod error;
pub mod logger;

pub use error::parse_id;
pub use logger::init_logger;
