//! Authentication handlers

use axum::{extract::State, Json};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::models::{Admin, LoginRequest, LoginResponse, ADMIN_ROLE};
use crate::store::AdminStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Admin ID
    pub email: String,
    pub role: String,
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

/// Admin login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;

    let admin = match state.admins.find_by_email(&req.email).await? {
        Some(admin) => admin,
        None => {
            tracing::warn!("Login attempt for unknown admin {}", req.email);
            return Err(AppError::InvalidCredentials);
        }
    };

    // Verify password
    let parsed_hash = PasswordHash::new(&admin.password_hash)
        .map_err(|_| AppError::InternalError("Invalid password hash".to_string()))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            tracing::warn!("Wrong password for admin {}", admin.email);
            AppError::InvalidCredentials
        })?;

    state.admins.record_login(admin.id).await?;

    let token = generate_jwt(&admin, &state.config.jwt_secret, state.config.jwt_expiration_hours)?;

    tracing::info!("Admin logged in: {}", admin.email);

    Ok(Json(LoginResponse { token }))
}

/// Create or refresh the configured admin account
pub async fn bootstrap_admin(admins: &dyn AdminStore, email: &str, password: &str) -> AppResult<Admin> {
    let password_hash = hash_password(password)?;
    let admin = admins.upsert(email, &password_hash).await?;
    tracing::info!("Admin account ready: {}", admin.email);
    Ok(admin)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(e.to_string()))
}

/// Generate JWT token
pub fn generate_jwt(admin: &Admin, secret: &str, expiration_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: admin.id.to_string(),
        email: admin.email.clone(),
        role: ADMIN_ROLE.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}
