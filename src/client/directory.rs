// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Published encryption public keys, one per user.

use crate::client::ClientError;
use crate::db::FirestoreDb;
use crate::models::UserKeyRecord;
use crate::time_utils::now_rfc3339;
use std::future::Future;

/// Lookup and publication of users' public keys (standard base64 raw points).
pub trait KeyDirectory: Send + Sync {
    fn get_public_key(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<String>, ClientError>> + Send;

    /// Create or replace `user_id`'s published key.
    fn upsert_public_key(
        &self,
        user_id: &str,
        public_key: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl KeyDirectory for FirestoreDb {
    async fn get_public_key(&self, user_id: &str) -> Result<Option<String>, ClientError> {
        let record = self
            .get_user_key(user_id)
            .await
            .map_err(|e| ClientError::Directory(e.to_string()))?;
        Ok(record.map(|r| r.public_key))
    }

    async fn upsert_public_key(&self, user_id: &str, public_key: &str) -> Result<(), ClientError> {
        let record = UserKeyRecord {
            user_id: user_id.to_string(),
            public_key: public_key.to_string(),
            updated_at: now_rfc3339(),
        };
        self.upsert_user_key(&record)
            .await
            .map_err(|e| ClientError::Directory(e.to_string()))
    }
}
