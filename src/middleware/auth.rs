// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer identity tokens and the internal trigger secret.

use crate::config::Config;
use crate::error::AppError;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Header carrying the shared secret on trigger calls.
pub const TRIGGER_SECRET_HEADER: &str = "x-trigger-secret";

/// Identity token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<usize>,
}

/// Authenticated user extracted from an identity token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Resolve the current user from an `Authorization: Bearer` header.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<AuthUser, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let key = DecodingKey::from_secret(&config.auth_jwt_secret);
    let mut validation = Validation::new(Algorithm::HS256);
    match &config.auth_audience {
        Some(aud) => validation.set_audience(&[aud.as_str()]),
        None => validation.validate_aud = false,
    }

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected identity token");
        AppError::Unauthorized
    })?;

    let user_id = token_data.claims.sub.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(AuthUser { user_id })
}

/// Check the trigger secret, if one is configured.
pub fn verify_trigger(headers: &HeaderMap, config: &Config) -> Result<(), AppError> {
    let Some(expected) = config.trigger_secret.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(TRIGGER_SECRET_HEADER)
        .map(|h| h.as_bytes())
        .unwrap_or_default();

    if bool::from(provided.ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        tracing::warn!("Blocked push trigger with missing or wrong secret");
        Err(AppError::Forbidden)
    }
}

/// Create an identity token (local tooling and tests).
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = usize::try_from(crate::time_utils::unix_now())?;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: Some(now),
        exp: now + 60 * 60, // 1 hour
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
