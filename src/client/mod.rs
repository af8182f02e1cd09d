// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side pieces.
//!
//! - `keys`: device keypair generation and local private-key storage
//! - `directory`: the published public-key directory
//! - `session`: the per-user key lifecycle and message encryption
//! - `push_api`: a typed client for the `/send-push` endpoint

pub mod directory;
pub mod keys;
pub mod push_api;
pub mod session;

pub use directory::KeyDirectory;
pub use keys::{
    generate_keypair, DeviceKeyPair, FileKeyStore, LocalKeyStore, MemoryKeyStore,
    PRIVATE_KEY_STORAGE_KEY,
};
pub use push_api::PushApiClient;
pub use session::{peer_public_key, EncryptionKeys, KeyState};

use crate::crypto::CryptoError;

/// Client-side failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("local key storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("key directory failed: {0}")]
    Directory(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("encryption keys are not initialized")]
    NotReady,
}
