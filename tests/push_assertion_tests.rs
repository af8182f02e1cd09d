// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VAPID assertion tests: shape, claims, and ES256 signature validity.

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use viewza::crypto::b64url_decode;
use viewza::db::FirestoreDb;
use viewza::services::assertion::{sign_assertion_at, ASSERTION_LIFETIME_SECS};
use viewza::services::{VapidClaims, VapidKeyManager, VapidKeys};

async fn test_keys() -> VapidKeys {
    VapidKeyManager::new(FirestoreDb::new_in_memory(), "mailto:ops@viewza.app")
        .get_or_create_keys()
        .await
        .unwrap()
}

/// Split and check a JWT, returning its claims.
fn verify(jwt: &str, public_key: &str) -> VapidClaims {
    let parts: Vec<&str> = jwt.split('.').collect();
    assert_eq!(parts.len(), 3, "JWT must have three segments");
    assert!(!jwt.contains('='), "segments must be unpadded");

    let header: serde_json::Value =
        serde_json::from_slice(&b64url_decode(parts[0]).unwrap()).unwrap();
    assert_eq!(header, serde_json::json!({"typ": "JWT", "alg": "ES256"}));

    let signature = b64url_decode(parts[2]).unwrap();
    assert_eq!(signature.len(), 64, "ES256 signatures are fixed-width r || s");

    let verifying_key = VerifyingKey::from_sec1_bytes(&b64url_decode(public_key).unwrap()).unwrap();
    let signature = Signature::from_slice(&signature).unwrap();
    let signing_input = format!("{}.{}", parts[0], parts[1]);
    verifying_key
        .verify(signing_input.as_bytes(), &signature)
        .expect("signature must verify against the VAPID public key");

    serde_json::from_slice(&b64url_decode(parts[1]).unwrap()).unwrap()
}

#[tokio::test]
async fn test_assertion_verifies_with_expected_claims() {
    let keys = test_keys().await;
    let issued_at = 1_760_000_000;

    let jwt = sign_assertion_at(
        &keys,
        "https://fcm.googleapis.com/fcm/send/abc:def",
        issued_at,
    )
    .unwrap();

    let claims = verify(&jwt, &keys.public_key);
    assert_eq!(claims.aud, "https://fcm.googleapis.com");
    assert_eq!(claims.exp, issued_at + ASSERTION_LIFETIME_SECS);
    assert_eq!(claims.exp - issued_at, 12 * 60 * 60);
    assert_eq!(claims.sub, "mailto:ops@viewza.app");
}

#[tokio::test]
async fn test_each_endpoint_gets_its_own_audience() {
    let keys = test_keys().await;

    let mozilla = sign_assertion_at(
        &keys,
        "https://updates.push.services.mozilla.com/wpush/v2/gAAAA",
        1_760_000_000,
    )
    .unwrap();
    let apple = sign_assertion_at(&keys, "https://web.push.apple.com/QGuQ", 1_760_000_000).unwrap();

    assert_ne!(mozilla, apple);
    assert_eq!(
        verify(&mozilla, &keys.public_key).aud,
        "https://updates.push.services.mozilla.com"
    );
    assert_eq!(verify(&apple, &keys.public_key).aud, "https://web.push.apple.com");
}

#[tokio::test]
async fn test_malformed_endpoint_is_rejected() {
    let keys = test_keys().await;
    assert!(sign_assertion_at(&keys, "not a url", 0).is_err());
    assert!(sign_assertion_at(&keys, "ftp://push.example/x", 0).is_err());
}
