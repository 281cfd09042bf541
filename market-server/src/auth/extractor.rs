//! JWT Extractor
//!
//! Custom extractors that validate the bearer token and hand the caller to
//! the handler as an [`Identity`].

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{Identity, JwtError, JwtService};
use crate::core::ServerState;
use shared::AppError;

impl FromRequestParts<ServerState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // reuse an identity another extractor already resolved
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => return Err(AppError::not_authenticated()),
        };

        match state.jwt.validate_token(token) {
            Ok(claims) => {
                let identity = Identity::try_from(claims)
                    .map_err(|e| AppError::invalid_token(format!("Malformed claims: {e}")))?;
                parts.extensions.insert(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(target: "auth", error = %e, uri = %parts.uri, "token rejected");
                match e {
                    JwtError::ExpiredToken => Err(AppError::token_expired()),
                    _ => Err(AppError::invalid_token("Invalid token")),
                }
            }
        }
    }
}
