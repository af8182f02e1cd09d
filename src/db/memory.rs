// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local document store used for local development and tests.
//!
//! Mirrors the Firestore semantics the service relies on: upserts overwrite
//! by document ID and `create` refuses to overwrite an existing document.

use crate::models::{Profile, PushSubscription, UserKeyRecord, VapidConfigRecord};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    push_config: DashMap<String, VapidConfigRecord>,
    subscriptions: DashMap<String, PushSubscription>,
    profiles: DashMap<String, Profile>,
    user_keys: DashMap<String, UserKeyRecord>,
}

impl MemoryStore {
    pub fn get_vapid_config(&self, id: &str) -> Option<VapidConfigRecord> {
        self.push_config.get(id).map(|r| r.value().clone())
    }

    /// Insert only if absent. Returns `false` when another writer got there first.
    pub fn create_vapid_config(&self, id: &str, record: &VapidConfigRecord) -> bool {
        match self.push_config.entry(id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                true
            }
        }
    }

    pub fn list_subscriptions(&self, user_id: &str) -> Vec<PushSubscription> {
        let mut subs: Vec<PushSubscription> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        subs.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        subs
    }

    pub fn upsert_subscription(&self, sub: &PushSubscription) {
        self.subscriptions.insert(sub.id.clone(), sub.clone());
    }

    pub fn delete_subscription(&self, id: &str) {
        self.subscriptions.remove(id);
    }

    pub fn get_profile(&self, user_id: &str) -> Option<Profile> {
        self.profiles.get(user_id).map(|r| r.value().clone())
    }

    pub fn upsert_profile(&self, profile: &Profile) {
        self.profiles
            .insert(profile.user_id.clone(), profile.clone());
    }

    pub fn get_user_key(&self, user_id: &str) -> Option<UserKeyRecord> {
        self.user_keys.get(user_id).map(|r| r.value().clone())
    }

    pub fn upsert_user_key(&self, record: &UserKeyRecord) {
        self.user_keys.insert(record.user_id.clone(), record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(public: &str) -> VapidConfigRecord {
        VapidConfigRecord {
            vapid_public_key: public.to_string(),
            vapid_private_key: "d".to_string(),
            vapid_subject: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_create_is_first_writer_wins() {
        let store = MemoryStore::default();

        assert!(store.create_vapid_config("default", &record("first")));
        assert!(!store.create_vapid_config("default", &record("second")));
        assert_eq!(
            store.get_vapid_config("default").unwrap().vapid_public_key,
            "first"
        );
    }
}
