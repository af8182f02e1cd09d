// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Push config (the VAPID keypair singleton)
//! - Push subscriptions (one document per user + endpoint)
//! - Profiles (read for actor display names)
//! - User keys (public-key directory for end-to-end encryption)

use crate::db::memory::MemoryStore;
use crate::db::{collections, VAPID_CONFIG_ID};
use crate::error::AppError;
use crate::models::{Profile, PushSubscription, UserKeyRecord, VapidConfigRecord};
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
    Offline,
}

/// Document database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a database backed by process-local maps.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── Push Config Operations ──────────────────────────────────

    /// Get the VAPID keypair record, if one has been created.
    pub async fn get_vapid_config(&self) -> Result<Option<VapidConfigRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::PUSH_CONFIG)
                .obj()
                .one(VAPID_CONFIG_ID)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.get_vapid_config(VAPID_CONFIG_ID)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Create the VAPID keypair record unless one already exists.
    ///
    /// Returns `false` if the document already existed; the caller should
    /// re-read and adopt the stored keys.
    pub async fn create_vapid_config(&self, record: &VapidConfigRecord) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let created: Result<VapidConfigRecord, _> = client
                    .fluent()
                    .insert()
                    .into(collections::PUSH_CONFIG)
                    .document_id(VAPID_CONFIG_ID)
                    .object(record)
                    .execute()
                    .await;

                match created {
                    Ok(_) => Ok(true),
                    Err(firestore::errors::FirestoreError::DataConflictError(_)) => Ok(false),
                    Err(e) => Err(AppError::Database(e.to_string())),
                }
            }
            Backend::Memory(store) => Ok(store.create_vapid_config(VAPID_CONFIG_ID, record)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    // ─── Push Subscription Operations ────────────────────────────

    /// Get all subscriptions registered by a user.
    pub async fn list_subscriptions(
        &self,
        user_id: &str,
    ) -> Result<Vec<PushSubscription>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let user_id = user_id.to_string();
                client
                    .fluent()
                    .select()
                    .from(collections::PUSH_SUBSCRIPTIONS)
                    .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            Backend::Memory(store) => Ok(store.list_subscriptions(user_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Create or replace a subscription (keyed by user + endpoint).
    pub async fn upsert_subscription(&self, sub: &PushSubscription) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::PUSH_SUBSCRIPTIONS)
                    .document_id(&sub.id)
                    .object(sub)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.upsert_subscription(sub);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Delete a subscription by document ID.
    pub async fn delete_subscription(&self, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                client
                    .fluent()
                    .delete()
                    .from(collections::PUSH_SUBSCRIPTIONS)
                    .document_id(id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.delete_subscription(id);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Delete a user's subscription for one endpoint (client unsubscribe).
    pub async fn delete_subscription_for_endpoint(
        &self,
        user_id: &str,
        endpoint: &str,
    ) -> Result<(), AppError> {
        self.delete_subscription(&PushSubscription::document_id(user_id, endpoint))
            .await
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user's public profile.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::PROFILES)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.get_profile(user_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Create or update a profile.
    ///
    /// Profiles are owned by the social app; this exists for local runs and tests.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::PROFILES)
                    .document_id(&profile.user_id)
                    .object(profile)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.upsert_profile(profile);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    // ─── User Key Directory Operations ───────────────────────────

    /// Get a user's published encryption public key.
    pub async fn get_user_key(&self, user_id: &str) -> Result<Option<UserKeyRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USER_KEYS)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.get_user_key(user_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Publish (or replace) a user's encryption public key.
    pub async fn upsert_user_key(&self, record: &UserKeyRecord) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USER_KEYS)
                    .document_id(&record.user_id)
                    .object(record)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.upsert_user_key(record);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }
}
