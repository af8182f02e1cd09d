// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VAPID assertion signing (RFC 8292).
//!
//! The assertion is a fixed-shape ES256 JWT:
//! `b64url({"typ":"JWT","alg":"ES256"}).b64url({aud, exp, sub}).b64url(r ‖ s)`.
//! It is valid for one push-service origin and expires 12 hours after
//! issuance, so a fresh one is signed for every delivery attempt.

use crate::crypto::{b64url_decode, b64url_encode, CryptoError, EcJwk};
use crate::services::vapid::VapidKeys;
use crate::time_utils::unix_now;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use serde::{Deserialize, Serialize};

/// Assertion lifetime (the RFC 8292 maximum is 24 hours).
pub const ASSERTION_LIFETIME_SECS: i64 = 12 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum AssertionError {
    #[error("invalid push endpoint: {0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("claims serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct AssertionHeader {
    typ: &'static str,
    alg: &'static str,
}

const HEADER: AssertionHeader = AssertionHeader {
    typ: "JWT",
    alg: "ES256",
};

/// Claims carried by a VAPID assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VapidClaims {
    /// Origin of the push service (`scheme://host[:port]`)
    pub aud: String,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Contact URI
    pub sub: String,
}

/// Audience for a push endpoint: its origin, without path or default port.
pub fn audience_for(endpoint: &str) -> Result<String, AssertionError> {
    let url =
        url::Url::parse(endpoint).map_err(|e| AssertionError::InvalidEndpoint(e.to_string()))?;

    if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
        return Err(AssertionError::InvalidEndpoint(format!(
            "unsupported endpoint scheme {}",
            url.scheme()
        )));
    }

    Ok(url.origin().ascii_serialization())
}

/// Sign an assertion for `endpoint`, issued now.
pub fn sign_assertion(keys: &VapidKeys, endpoint: &str) -> Result<String, AssertionError> {
    sign_assertion_at(keys, endpoint, unix_now())
}

/// Sign an assertion for `endpoint`, issued at `issued_at` (Unix seconds).
pub fn sign_assertion_at(
    keys: &VapidKeys,
    endpoint: &str,
    issued_at: i64,
) -> Result<String, AssertionError> {
    let claims = VapidClaims {
        aud: audience_for(endpoint)?,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
        sub: keys.subject.clone(),
    };

    let header_b64 = b64url_encode(&serde_json::to_vec(&HEADER)?);
    let claims_b64 = b64url_encode(&serde_json::to_vec(&claims)?);
    let signing_input = format!("{}.{}", header_b64, claims_b64);

    // The stored form is (raw point, d); the signer imports it as a JWK.
    let jwk = EcJwk::from_raw_public(
        &b64url_decode(&keys.public_key)?,
        Some(keys.private_key.clone()),
    )?;
    let signature = sign_es256(&jwk, signing_input.as_bytes())?;

    Ok(format!("{}.{}", signing_input, b64url_encode(&signature)))
}

/// `Authorization` header value for a push request.
pub fn authorization_header(jwt: &str, public_key: &str) -> String {
    format!("vapid t={}, k={}", jwt, public_key)
}

/// ECDSA P-256 / SHA-256 with the fixed-width 64-byte `r ‖ s` encoding JWS requires.
fn sign_es256(jwk: &EcJwk, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_private_key_and_public_key(
        &ECDSA_P256_SHA256_FIXED_SIGNING,
        &jwk.private_scalar()?,
        &jwk.raw_public()?,
        &rng,
    )
    .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;

    let signature = key_pair
        .sign(&rng, message)
        .map_err(|_| CryptoError::Signing)?;
    Ok(signature.as_ref().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_is_origin() {
        assert_eq!(
            audience_for("https://fcm.googleapis.com/fcm/send/abc123").unwrap(),
            "https://fcm.googleapis.com"
        );
        assert_eq!(
            audience_for("https://updates.push.services.mozilla.com:443/wpush/v2/x").unwrap(),
            "https://updates.push.services.mozilla.com"
        );
        assert_eq!(
            audience_for("http://a.example:8081/push/1").unwrap(),
            "http://a.example:8081"
        );
    }

    #[test]
    fn test_audience_rejects_non_http_endpoints() {
        assert!(audience_for("mailto:someone@example.com").is_err());
        assert!(audience_for("/relative/path").is_err());
    }

    #[test]
    fn test_authorization_header_format() {
        assert_eq!(
            authorization_header("a.b.c", "BPUB"),
            "vapid t=a.b.c, k=BPUB"
        );
    }

    #[test]
    fn test_header_json_shape() {
        assert_eq!(
            serde_json::to_string(&HEADER).unwrap(),
            r#"{"typ":"JWT","alg":"ES256"}"#
        );
    }
}
