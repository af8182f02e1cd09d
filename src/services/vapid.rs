// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VAPID credential management.
//!
//! The service has exactly one P-256 signing identity. It is created on
//! first use, stored in `push_config/default`, and never rotated: every
//! browser subscription is bound to the public key it was created with.
//!
//! Concurrent first-time callers race on a create-only insert. Losers
//! re-read and adopt the winner's keys, so there is never more than one
//! accepted keypair. The in-process copy is only a cached read.

use crate::crypto::{b64url_encode, raw_public_key, EcJwk};
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::VapidConfigRecord;
use crate::time_utils::now_rfc3339;
use rand_core::OsRng;
use serde::Serialize;
use tokio::sync::RwLock;

/// The service signing identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeys {
    /// Raw uncompressed public point, base64url
    pub public_key: String,
    /// Private scalar `d`, base64url
    #[serde(skip_serializing)]
    pub private_key: String,
    /// Contact URI (`mailto:` or `https:`)
    pub subject: String,
}

/// Get-or-create repository for the VAPID keypair.
pub struct VapidKeyManager {
    db: FirestoreDb,
    default_subject: String,
    cached: RwLock<Option<VapidKeys>>,
}

impl VapidKeyManager {
    pub fn new(db: FirestoreDb, default_subject: impl Into<String>) -> Self {
        Self {
            db,
            default_subject: default_subject.into(),
            cached: RwLock::new(None),
        }
    }

    /// Return the service keypair, generating and persisting it on first use.
    pub async fn get_or_create_keys(&self) -> Result<VapidKeys, AppError> {
        if let Some(keys) = self.cached.read().await.as_ref() {
            return Ok(keys.clone());
        }

        let keys = self.load_or_create().await?;
        *self.cached.write().await = Some(keys.clone());
        Ok(keys)
    }

    /// Public key for browsers' `applicationServerKey`.
    pub async fn public_key(&self) -> Result<String, AppError> {
        Ok(self.get_or_create_keys().await?.public_key)
    }

    async fn load_or_create(&self) -> Result<VapidKeys, AppError> {
        if let Some(record) = self.db.get_vapid_config().await? {
            tracing::debug!("Loaded existing VAPID keypair");
            return Ok(self.keys_from_record(record));
        }

        let record = generate_record(&self.default_subject);
        if self.db.create_vapid_config(&record).await? {
            tracing::info!(public_key = %record.vapid_public_key, "Generated new VAPID keypair");
            return Ok(self.keys_from_record(record));
        }

        // Another instance created the keypair between our read and insert.
        tracing::info!("VAPID keypair created concurrently, adopting stored keys");
        self.db
            .get_vapid_config()
            .await?
            .map(|record| self.keys_from_record(record))
            .ok_or_else(|| {
                AppError::Database("VAPID config missing after conflicting insert".to_string())
            })
    }

    fn keys_from_record(&self, record: VapidConfigRecord) -> VapidKeys {
        let subject = record
            .vapid_subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.default_subject.clone());

        VapidKeys {
            public_key: record.vapid_public_key,
            private_key: record.vapid_private_key,
            subject,
        }
    }
}

/// Generate a fresh P-256 keypair as a storable record.
fn generate_record(subject: &str) -> VapidConfigRecord {
    let secret = p256::SecretKey::random(&mut OsRng);
    let jwk = EcJwk::from_secret_key(&secret);

    VapidConfigRecord {
        vapid_public_key: b64url_encode(&raw_public_key(&secret.public_key())),
        vapid_private_key: jwk.d.unwrap_or_default(),
        vapid_subject: Some(subject.to_string()),
        created_at: now_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::b64url_decode;

    #[test]
    fn test_generated_keys_have_expected_sizes() {
        let record = generate_record("mailto:ops@example.com");

        let public = b64url_decode(&record.vapid_public_key).unwrap();
        assert_eq!(public.len(), 65);
        assert_eq!(public[0], 0x04);
        assert_eq!(b64url_decode(&record.vapid_private_key).unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_stored_record_without_subject_uses_default() {
        let db = FirestoreDb::new_in_memory();
        let mut record = generate_record("mailto:ignored@example.com");
        record.vapid_subject = None;
        assert!(db.create_vapid_config(&record).await.unwrap());

        let manager = VapidKeyManager::new(db, "mailto:default@example.com");
        let keys = manager.get_or_create_keys().await.unwrap();

        assert_eq!(keys.subject, "mailto:default@example.com");
        assert_eq!(keys.public_key, record.vapid_public_key);
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let manager = VapidKeyManager::new(FirestoreDb::new_mock(), "mailto:x@example.com");
        assert!(matches!(
            manager.get_or_create_keys().await,
            Err(AppError::Database(_))
        ));
    }

    #[test]
    fn test_private_key_is_not_serialized() {
        let keys = VapidKeys {
            public_key: "pub".to_string(),
            private_key: "secret".to_string(),
            subject: "mailto:x@example.com".to_string(),
        };
        let json = serde_json::to_value(&keys).unwrap();
        assert_eq!(json["publicKey"], "pub");
        assert!(json.get("privateKey").is_none());
    }
}
