// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device keypairs and where their private half lives.

use crate::client::ClientError;
use crate::crypto::{b64_encode, raw_public_key, CryptoError, EcJwk};
use dashmap::DashMap;
use rand_core::OsRng;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes temp files of concurrent writers in one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Storage key of the private JWK blob.
pub const PRIVATE_KEY_STORAGE_KEY: &str = "viewza_e2e_private_key";

/// Device-local string storage for key material.
///
/// Values never leave the device; implementations decide how durable they are.
pub trait LocalKeyStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn store(&self, key: &str, value: &str) -> Result<(), ClientError>;
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    dir: PathBuf,
}

impl FileKeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LocalKeyStore for FileKeyStore {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir)?;

        // Write then rename so a crash never leaves a truncated key.
        let path = self.path_for(key);
        let tmp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = write_private(&tmp, value) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Create `path` readable by the owner only and write `value` to it.
fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()
}

/// Process-local store (tests, ephemeral sessions).
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    entries: DashMap<String, String>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalKeyStore for MemoryKeyStore {
    fn load(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A device's ECDH keypair.
#[derive(Debug, Clone)]
pub struct DeviceKeyPair {
    /// Raw uncompressed point, standard base64 (directory form)
    pub public_key: String,
    /// Private JWK (local storage form)
    pub private_jwk: EcJwk,
}

impl DeviceKeyPair {
    /// Rebuild a keypair from a stored private JWK, rejecting inconsistent keys.
    pub fn from_private_jwk(private_jwk: EcJwk) -> Result<Self, CryptoError> {
        let secret = private_jwk.to_secret_key()?;
        Ok(Self {
            public_key: b64_encode(&raw_public_key(&secret.public_key())),
            private_jwk,
        })
    }
}

/// Generate a fresh P-256 ECDH keypair.
pub fn generate_keypair() -> DeviceKeyPair {
    let secret = p256::SecretKey::random(&mut OsRng);
    DeviceKeyPair {
        public_key: b64_encode(&raw_public_key(&secret.public_key())),
        private_jwk: EcJwk::from_secret_key(&secret),
    }
}
