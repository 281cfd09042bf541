//! Authentication Module
//!
//! JWT issuing/validation and the request extractors that turn a bearer
//! token into an [`Identity`]. Handlers receive the caller explicitly and
//! pass it into domain operations; there is no ambient current-user state.

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, Identity, JwtConfig, JwtError, JwtService};
