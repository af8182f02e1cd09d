// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! P-256 key material shared by VAPID signing and message encryption.
//!
//! Public keys travel as raw uncompressed SEC1 points (65 bytes, `0x04 ‖ X ‖ Y`).
//! Private keys travel as EC JWKs, the same shape a browser's
//! `crypto.subtle.exportKey("jwk", ...)` produces.

pub mod e2e;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};

/// Length of an uncompressed P-256 point.
pub const RAW_PUBLIC_KEY_LEN: usize = 65;
/// Length of a P-256 scalar or coordinate.
pub const COORDINATE_LEN: usize = 32;

/// Crypto failures. Messages never include key material.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid JWK: {0}")]
    InvalidJwk(String),

    #[error("signing failed")]
    Signing,

    #[error("encryption failed")]
    Encryption,

    #[error("decryption failed")]
    Decryption,

    #[error("payload too short")]
    PayloadTooShort,

    #[error("plaintext is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Base64url without padding (JWS, JWK and VAPID encoding).
pub fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64url, tolerating trailing `=` padding some clients emit.
pub fn b64url_decode(input: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(URL_SAFE_NO_PAD.decode(input.trim().trim_end_matches('='))?)
}

/// Standard padded base64 (message payloads and directory public keys).
pub fn b64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn b64_decode(input: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(STANDARD.decode(input.trim())?)
}

/// An EC P-256 JSON Web Key (RFC 7517). `d` is present only for private keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
}

impl EcJwk {
    /// Build a JWK from a raw uncompressed public point and an optional
    /// base64url private scalar.
    pub fn from_raw_public(raw: &[u8], d: Option<String>) -> Result<Self, CryptoError> {
        if raw.len() != RAW_PUBLIC_KEY_LEN || raw[0] != 0x04 {
            return Err(CryptoError::InvalidPublicKey(format!(
                "expected {} byte uncompressed point",
                RAW_PUBLIC_KEY_LEN
            )));
        }

        Ok(Self {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: b64url_encode(&raw[1..1 + COORDINATE_LEN]),
            y: b64url_encode(&raw[1 + COORDINATE_LEN..]),
            d,
            ext: None,
            key_ops: None,
        })
    }

    /// Export a private JWK for a secret key.
    pub fn from_secret_key(secret: &p256::SecretKey) -> Self {
        let raw = raw_public_key(&secret.public_key());
        Self {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: b64url_encode(&raw[1..1 + COORDINATE_LEN]),
            y: b64url_encode(&raw[1 + COORDINATE_LEN..]),
            d: Some(b64url_encode(&secret.to_bytes())),
            ext: Some(true),
            key_ops: Some(vec!["deriveBits".to_string()]),
        }
    }

    /// Reassemble the raw uncompressed point from `x` and `y`.
    pub fn raw_public(&self) -> Result<Vec<u8>, CryptoError> {
        if self.kty != "EC" || self.crv != "P-256" {
            return Err(CryptoError::InvalidJwk(format!(
                "unsupported key type {}/{}",
                self.kty, self.crv
            )));
        }

        let x = b64url_decode(&self.x)?;
        let y = b64url_decode(&self.y)?;
        if x.len() != COORDINATE_LEN || y.len() != COORDINATE_LEN {
            return Err(CryptoError::InvalidJwk("bad coordinate length".to_string()));
        }

        let mut raw = Vec::with_capacity(RAW_PUBLIC_KEY_LEN);
        raw.push(0x04);
        raw.extend_from_slice(&x);
        raw.extend_from_slice(&y);
        Ok(raw)
    }

    /// Decode the private scalar `d`.
    pub fn private_scalar(&self) -> Result<Vec<u8>, CryptoError> {
        let d = self
            .d
            .as_deref()
            .ok_or_else(|| CryptoError::InvalidJwk("missing private scalar d".to_string()))?;
        let bytes = b64url_decode(d)?;
        if bytes.len() != COORDINATE_LEN {
            return Err(CryptoError::InvalidPrivateKey(
                "scalar must be 32 bytes".to_string(),
            ));
        }
        Ok(bytes)
    }

    /// Import as a P-256 secret key, checking that `x`/`y` belong to `d`.
    pub fn to_secret_key(&self) -> Result<p256::SecretKey, CryptoError> {
        let secret = p256::SecretKey::from_slice(&self.private_scalar()?)
            .map_err(|_| CryptoError::InvalidPrivateKey("scalar out of range".to_string()))?;

        let expected = secret.public_key().to_encoded_point(false);
        if expected.as_bytes() != self.raw_public()?.as_slice() {
            return Err(CryptoError::InvalidJwk(
                "public coordinates do not match d".to_string(),
            ));
        }

        Ok(secret)
    }
}

/// Parse a raw uncompressed point into a P-256 public key.
pub fn public_key_from_raw(raw: &[u8]) -> Result<p256::PublicKey, CryptoError> {
    if raw.len() != RAW_PUBLIC_KEY_LEN {
        return Err(CryptoError::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            RAW_PUBLIC_KEY_LEN,
            raw.len()
        )));
    }
    p256::PublicKey::from_sec1_bytes(raw)
        .map_err(|_| CryptoError::InvalidPublicKey("point is not on the curve".to_string()))
}

/// Raw uncompressed encoding of a public key.
pub fn raw_public_key(public: &p256::PublicKey) -> Vec<u8> {
    public.to_encoded_point(false).as_bytes().to_vec()
}
