// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end message encryption between two correspondents.
//!
//! Each side derives the same AES-256-GCM key from its own private key and
//! the other side's public key (P-256 ECDH). The raw 32-byte ECDH output is
//! the AES key; no KDF is applied, which keeps ciphertexts compatible with
//! browser clients using WebCrypto `deriveBits(256)`.
//!
//! Wire format: `base64(IV[12] ‖ ciphertext ‖ tag[16])`.

use super::{b64_decode, b64_encode, public_key_from_raw, CryptoError, EcJwk};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

/// Shown in place of a message body that cannot be decrypted.
pub const DECRYPT_FAILURE_PLACEHOLDER: &str = "[Unable to decrypt]";

/// A symmetric key shared by exactly two correspondents.
pub struct SharedKey {
    key: LessSafeKey,
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedKey(..)")
    }
}

impl SharedKey {
    /// Seal `plaintext` under a fresh random IV.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut iv = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut iv)
            .map_err(|_| CryptoError::Encryption)?;

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption)?;

        let mut payload = Vec::with_capacity(NONCE_LEN + in_out.len());
        payload.extend_from_slice(&iv);
        payload.extend_from_slice(&in_out);
        Ok(payload)
    }

    /// Open an `IV ‖ ciphertext ‖ tag` payload.
    pub fn open(&self, payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if payload.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(CryptoError::PayloadTooShort);
        }

        let (iv, ciphertext) = payload.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(iv).map_err(|_| CryptoError::Decryption)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Decryption)?;
        Ok(plaintext.to_vec())
    }
}

/// Derive the AES-256-GCM key shared with a peer.
pub fn derive_shared_key(
    own_private: &EcJwk,
    peer_public_b64: &str,
) -> Result<SharedKey, CryptoError> {
    let secret = own_private.to_secret_key()?;
    let peer = public_key_from_raw(&b64_decode(peer_public_b64)?)?;

    let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let unbound = UnboundKey::new(&AES_256_GCM, shared.raw_secret_bytes())
        .map_err(|_| CryptoError::Encryption)?;

    Ok(SharedKey {
        key: LessSafeKey::new(unbound),
    })
}

/// Encrypt a message body for `peer_public_b64`.
pub fn encrypt(
    plaintext: &str,
    own_private: &EcJwk,
    peer_public_b64: &str,
) -> Result<String, CryptoError> {
    let key = derive_shared_key(own_private, peer_public_b64)?;
    Ok(b64_encode(&key.seal(plaintext.as_bytes())?))
}

/// Decrypt a message body, reporting why it failed.
pub fn try_decrypt(
    payload_b64: &str,
    own_private: &EcJwk,
    peer_public_b64: &str,
) -> Result<String, CryptoError> {
    let key = derive_shared_key(own_private, peer_public_b64)?;
    let plaintext = key.open(&b64_decode(payload_b64)?)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Decrypt a message body for display.
///
/// Messages encrypted against a superseded key are expected, so every
/// failure becomes [`DECRYPT_FAILURE_PLACEHOLDER`].
pub fn decrypt(payload_b64: &str, own_private: &EcJwk, peer_public_b64: &str) -> String {
    match try_decrypt(payload_b64, own_private, peer_public_b64) {
        Ok(plaintext) => plaintext,
        Err(e) => {
            tracing::debug!(error = %e, "Message could not be decrypted");
            DECRYPT_FAILURE_PLACEHOLDER.to_string()
        }
    }
}
