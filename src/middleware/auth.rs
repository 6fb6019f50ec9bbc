//! Authentication middleware

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
    http::header::AUTHORIZATION,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::{AppState, AppError};
use crate::handlers::auth::Claims;
use crate::models::ADMIN_ROLE;

/// Admin context extracted from JWT
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin_id: Uuid,
    pub email: String,
}

/// Middleware: Require admin JWT authentication
pub async fn require_admin_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default()
    ).map_err(|e| {
        tracing::warn!("Rejected admin token: {}", e);
        AppError::TokenInvalid
    })?;

    let claims = token_data.claims;

    if claims.role != ADMIN_ROLE {
        tracing::warn!("Admin required but token for {} has role '{}'", claims.email, claims.role);
        return Err(AppError::Forbidden);
    }

    let admin_ctx = AdminContext {
        admin_id: Uuid::parse_str(&claims.sub).map_err(|_| AppError::TokenInvalid)?,
        email: claims.email,
    };

    req.extensions_mut().insert(admin_ctx);

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::TokenMissing)?
        .to_str()
        .map_err(|_| AppError::TokenInvalid)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::TokenInvalid)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<AdminContext>()
            .cloned()
            .ok_or(AppError::TokenMissing)
    }
}
