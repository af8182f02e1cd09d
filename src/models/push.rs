// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Web Push subscription and VAPID configuration models.

use crate::crypto::{b64url_decode, RAW_PUBLIC_KEY_LEN};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the client auth secret (RFC 8291).
pub const AUTH_SECRET_LEN: usize = 16;
/// Upper bound on endpoint URLs we accept from browsers.
const MAX_ENDPOINT_LEN: usize = 2048;

/// Browser subscription as produced by `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Client keys of a browser subscription (both base64url).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

impl SubscriptionInfo {
    /// Check the endpoint is an absolute http(s) URL and the keys decode to
    /// the sizes push services expect.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.len() > MAX_ENDPOINT_LEN {
            return Err("endpoint too long".to_string());
        }

        let url = url::Url::parse(&self.endpoint).map_err(|_| "invalid endpoint URL".to_string())?;
        if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
            return Err("endpoint must be an http(s) URL".to_string());
        }

        match b64url_decode(&self.keys.p256dh) {
            Ok(raw) if raw.len() == RAW_PUBLIC_KEY_LEN && raw[0] == 0x04 => {}
            _ => return Err("invalid p256dh key".to_string()),
        }

        match b64url_decode(&self.keys.auth) {
            Ok(raw) if raw.len() == AUTH_SECRET_LEN => {}
            _ => return Err("invalid auth secret".to_string()),
        }

        Ok(())
    }
}

/// A stored push subscription, unique per (user, endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Document ID, derived from (user_id, endpoint)
    pub id: String,
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    /// Last (re-)subscribe time (RFC 3339)
    pub updated_at: String,
}

impl PushSubscription {
    pub fn new(user_id: &str, info: &SubscriptionInfo, updated_at: String) -> Self {
        Self {
            id: Self::document_id(user_id, &info.endpoint),
            user_id: user_id.to_string(),
            endpoint: info.endpoint.clone(),
            p256dh: info.keys.p256dh.clone(),
            auth: info.keys.auth.clone(),
            updated_at,
        }
    }

    /// Deterministic document ID, so re-subscribing overwrites the old keys.
    pub fn document_id(user_id: &str, endpoint: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(endpoint.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Singleton VAPID keypair record (`push_config/default`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VapidConfigRecord {
    /// Raw uncompressed public point, base64url
    pub vapid_public_key: String,
    /// Private scalar `d`, base64url
    pub vapid_private_key: String,
    #[serde(default)]
    pub vapid_subject: Option<String>,
    pub created_at: String,
}
