//! Auth API Handlers

use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::{RepoError, user::UserCreate};
use shared::error::ErrorCode;
use shared::models::Role;
use shared::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Optional confirmation; must match `password` when present
    pub repeated_password: Option<String>,
    #[serde(rename = "type")]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: i64,
}

/// POST /auth/registration/ - create an account and issue a token
pub async fn registration(
    State(state): State<ServerState>,
    Json(payload): Json<RegistrationRequest>,
) -> AppResult<Json<AuthResponse>> {
    if payload.username.trim().is_empty() {
        return Err(AppError::field_validation("username", "Username is required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::field_validation("password", "Password is required"));
    }
    if let Some(repeated) = &payload.repeated_password
        && repeated != &payload.password
    {
        return Err(AppError::field_validation(
            "repeated_password",
            "Passwords do not match",
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = state
        .users()
        .create(UserCreate {
            username: payload.username,
            first_name: String::new(),
            last_name: String::new(),
            email: payload.email,
            password_hash,
            role: payload.role,
            is_staff: false,
        })
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => {
                AppError::new(ErrorCode::UsernameExists).with_detail(
                    "username",
                    "A user with that username already exists",
                )
            }
            other => AppError::database(other.to_string()),
        })?;

    let token = state
        .jwt
        .generate_token(&user)
        .map_err(|e| AppError::internal(e.to_string()))?;

    tracing::info!(user_id = user.id, username = %user.username, "account registered");

    Ok(Json(AuthResponse {
        token,
        username: user.username,
        email: user.email,
        user_id: user.id,
    }))
}

/// POST /auth/login/ - authenticate and issue a token
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .users()
        .find_by_username(&payload.username)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(AppError::invalid_credentials)?;

    verify_password(&payload.password, &user.password_hash)?;

    let token = state
        .jwt
        .generate_token(&user)
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        username: user.username,
        email: user.email,
        user_id: user.id,
    }))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::internal(format!("Stored hash is malformed: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::invalid_credentials())
}
