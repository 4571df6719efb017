//! Bearer-token verification.
//!
//! Tokens are issued elsewhere; this service only checks the HS256 signature
//! and expiry, then hands the learner id to handlers via [`AuthLearner`].

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
impl Claims {
    pub fn new(learner_id: Uuid, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: learner_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// The authenticated learner making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthLearner(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthLearner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = verify_token(token, &state.config.jwt_secret)?;
        Ok(AuthLearner(claims.sub))
    }
}

/// Tokens are minted by the identity service; this signs them for tests.
#[cfg(test)]
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT generation failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    if secret.is_empty() {
        return Err(AppError::Unauthorized("JWT secret not configured".to_string()));
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid JWT token: {e}")))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(AppError::Unauthorized("Empty bearer token".to_string())),
        None => Err(AppError::Unauthorized(
            "Authorization header must use Bearer scheme".to_string(),
        )),
    }
}
