// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user encryption key lifecycle.
//!
//! `Uninitialized -> Checking -> Ready`. While checking, a valid local
//! private key is adopted if the directory already lists the user;
//! otherwise a fresh keypair is generated, stored locally, and published.
//! Publishing replaces whatever key the directory held for the user, so
//! a second device makes messages encrypted to the first undecryptable.

use crate::client::directory::KeyDirectory;
use crate::client::keys::{generate_keypair, DeviceKeyPair, LocalKeyStore, PRIVATE_KEY_STORAGE_KEY};
use crate::client::ClientError;
use crate::crypto::e2e::{self, DECRYPT_FAILURE_PLACEHOLDER};
use crate::crypto::EcJwk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Uninitialized,
    Checking,
    Ready,
}

/// The signed-in user's encryption keys on this device.
#[derive(Debug)]
pub struct EncryptionKeys {
    state: KeyState,
    user_id: Option<String>,
    keys: Option<DeviceKeyPair>,
}

impl Default for EncryptionKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptionKeys {
    pub fn new() -> Self {
        Self {
            state: KeyState::Uninitialized,
            user_id: None,
            keys: None,
        }
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == KeyState::Ready
    }

    /// Own public key (standard base64), once ready.
    pub fn public_key(&self) -> Option<&str> {
        self.keys.as_ref().map(|k| k.public_key.as_str())
    }

    /// Bring keys for `user_id` to `Ready`.
    ///
    /// Calling again for the same user once ready is a no-op. On error the
    /// state returns to `Uninitialized` and the call may be retried.
    pub async fn initialize<S, D>(
        &mut self,
        user_id: &str,
        store: &S,
        directory: &D,
    ) -> Result<(), ClientError>
    where
        S: LocalKeyStore + ?Sized,
        D: KeyDirectory + ?Sized,
    {
        if self.state == KeyState::Ready && self.user_id.as_deref() == Some(user_id) {
            return Ok(());
        }

        self.state = KeyState::Checking;
        self.user_id = Some(user_id.to_string());
        self.keys = None;

        match check_or_create(user_id, store, directory).await {
            Ok(keys) => {
                self.keys = Some(keys);
                self.state = KeyState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to initialize encryption keys");
                self.user_id = None;
                self.state = KeyState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Encrypt a message body for a peer.
    pub fn encrypt_for(&self, plaintext: &str, peer_public_b64: &str) -> Result<String, ClientError> {
        let keys = self.ready_keys().ok_or(ClientError::NotReady)?;
        Ok(e2e::encrypt(plaintext, &keys.private_jwk, peer_public_b64)?)
    }

    /// Decrypt a message body from a peer, or the placeholder if that fails.
    pub fn decrypt_from(&self, payload_b64: &str, peer_public_b64: &str) -> String {
        match self.ready_keys() {
            Some(keys) => e2e::decrypt(payload_b64, &keys.private_jwk, peer_public_b64),
            None => DECRYPT_FAILURE_PLACEHOLDER.to_string(),
        }
    }

    fn ready_keys(&self) -> Option<&DeviceKeyPair> {
        match self.state {
            KeyState::Ready => self.keys.as_ref(),
            _ => None,
        }
    }
}

/// Published public key of another user, if they have one.
pub async fn peer_public_key<D>(directory: &D, user_id: &str) -> Result<Option<String>, ClientError>
where
    D: KeyDirectory + ?Sized,
{
    directory.get_public_key(user_id).await
}

async fn check_or_create<S, D>(
    user_id: &str,
    store: &S,
    directory: &D,
) -> Result<DeviceKeyPair, ClientError>
where
    S: LocalKeyStore + ?Sized,
    D: KeyDirectory + ?Sized,
{
    if let Some(existing) = load_local(store)? {
        if directory.get_public_key(user_id).await?.is_some() {
            tracing::debug!(user_id, "Adopted stored encryption key");
            return Ok(existing);
        }
    }

    let keys = generate_keypair();
    store.store(
        PRIVATE_KEY_STORAGE_KEY,
        &serde_json::to_string(&keys.private_jwk)?,
    )?;
    directory.upsert_public_key(user_id, &keys.public_key).await?;

    tracing::info!(user_id, "Published new encryption key");
    Ok(keys)
}

/// The stored private key, or `None` if absent or unusable.
fn load_local<S>(store: &S) -> Result<Option<DeviceKeyPair>, ClientError>
where
    S: LocalKeyStore + ?Sized,
{
    let Some(blob) = store.load(PRIVATE_KEY_STORAGE_KEY)? else {
        return Ok(None);
    };

    let parsed = serde_json::from_str::<EcJwk>(&blob)
        .map_err(ClientError::from)
        .and_then(|jwk| Ok(DeviceKeyPair::from_private_jwk(jwk)?));

    match parsed {
        Ok(keys) => Ok(Some(keys)),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unusable stored encryption key");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_until_initialized() {
        let keys = EncryptionKeys::new();
        assert_eq!(keys.state(), KeyState::Uninitialized);
        assert!(keys.public_key().is_none());
        assert!(matches!(
            keys.encrypt_for("hi", "AAAA"),
            Err(ClientError::NotReady)
        ));
        assert_eq!(keys.decrypt_from("AAAA", "AAAA"), DECRYPT_FAILURE_PLACEHOLDER);
    }
}
