//! Market Server - marketplace backend connecting business and customer accounts
//!
//! # Module structure
//!
//! ```text
//! market-server/src/
//! ├── core/          # configuration, state, server lifecycle
//! ├── auth/          # JWT issuing/validation, identity extraction
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SQLite pool, migrations, repositories
//! └── utils/         # logging, handler helpers
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

pub use auth::{Identity, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{init_logger, parse_id};

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
