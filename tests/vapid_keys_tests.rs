// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VAPID keypair singleton tests.
//!
//! Every caller, including separate manager instances racing on an empty
//! store, must end up with the one persisted keypair.

use futures_util::future::join_all;
use viewza::crypto::b64url_decode;
use viewza::db::FirestoreDb;
use viewza::services::VapidKeyManager;

#[tokio::test]
async fn test_get_or_create_is_idempotent() {
    let db = FirestoreDb::new_in_memory();
    let manager = VapidKeyManager::new(db.clone(), "mailto:ops@viewza.app");

    let first = manager.get_or_create_keys().await.unwrap();
    let second = manager.get_or_create_keys().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.subject, "mailto:ops@viewza.app");

    let stored = db.get_vapid_config().await.unwrap().unwrap();
    assert_eq!(stored.vapid_public_key, first.public_key);
    assert_eq!(stored.vapid_private_key, first.private_key);

    let raw = b64url_decode(&first.public_key).unwrap();
    assert_eq!(raw.len(), 65);
    assert_eq!(raw[0], 0x04);
}

#[tokio::test]
async fn test_fresh_manager_adopts_stored_keys() {
    let db = FirestoreDb::new_in_memory();
    let original = VapidKeyManager::new(db.clone(), "mailto:ops@viewza.app")
        .get_or_create_keys()
        .await
        .unwrap();

    // A restarted instance has an empty cache.
    let restarted = VapidKeyManager::new(db, "mailto:ops@viewza.app");
    assert_eq!(restarted.get_or_create_keys().await.unwrap(), original);
}

#[tokio::test]
async fn test_concurrent_first_use_yields_one_keypair() {
    let db = FirestoreDb::new_in_memory();
    let managers: Vec<_> = (0..8)
        .map(|_| VapidKeyManager::new(db.clone(), "mailto:ops@viewza.app"))
        .collect();

    let results = join_all(managers.iter().map(|m| m.get_or_create_keys())).await;
    let keys: Vec<_> = results.into_iter().map(Result::unwrap).collect();

    let stored = db.get_vapid_config().await.unwrap().unwrap();
    for k in &keys {
        assert_eq!(k.public_key, stored.vapid_public_key);
        assert_eq!(k.private_key, stored.vapid_private_key);
    }
}

#[tokio::test]
async fn test_public_key_matches_signing_key() {
    let manager = VapidKeyManager::new(FirestoreDb::new_in_memory(), "mailto:ops@viewza.app");
    let keys = manager.get_or_create_keys().await.unwrap();

    let secret = p256::SecretKey::from_slice(&b64url_decode(&keys.private_key).unwrap()).unwrap();
    let derived = viewza::crypto::raw_public_key(&secret.public_key());
    assert_eq!(derived, b64url_decode(&manager.public_key().await.unwrap()).unwrap());
}
