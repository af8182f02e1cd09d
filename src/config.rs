// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Contact URI sent as the VAPID `sub` claim when none is configured.
pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:hello@viewza.app";

/// Where documents are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Firestore (or the emulator when FIRESTORE_EMULATOR_HOST is set)
    Firestore,
    /// Process-local maps, for local development
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Document store backend
    pub storage: StorageBackend,
    /// Expected `aud` of identity tokens, if any
    pub auth_audience: Option<String>,

    // --- Push delivery ---
    /// VAPID contact subject (mailto: or https: URI)
    pub vapid_subject: String,
    /// TTL header sent to push services, in seconds
    pub push_ttl_secs: u32,
    /// Per-request timeout for push service calls
    pub push_timeout: Duration,
    /// Maximum endpoints contacted concurrently per delivery
    pub push_concurrency: usize,

    // --- Secrets ---
    /// HS256 key that signs bearer identity tokens (raw bytes)
    pub auth_jwt_secret: Vec<u8>,
    /// Shared secret required on trigger calls, if set
    pub trigger_secret: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            auth_audience: None,
            vapid_subject: DEFAULT_VAPID_SUBJECT.to_string(),
            push_ttl_secs: 86_400,
            push_timeout: Duration::from_secs(10),
            push_concurrency: 16,
            auth_jwt_secret: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            trigger_secret: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "firestore" => StorageBackend::Firestore,
            "memory" => StorageBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORAGE_BACKEND")),
        };

        let push_concurrency: usize = parse_or("PUSH_CONCURRENCY", 16)?;
        if push_concurrency == 0 {
            return Err(ConfigError::Invalid("PUSH_CONCURRENCY"));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080)?,
            storage,
            auth_audience: non_empty_var("AUTH_JWT_AUDIENCE"),

            vapid_subject: non_empty_var("VAPID_SUBJECT")
                .unwrap_or_else(|| DEFAULT_VAPID_SUBJECT.to_string()),
            push_ttl_secs: parse_or("PUSH_TTL_SECS", 86_400)?,
            push_timeout: Duration::from_secs(parse_or("PUSH_TIMEOUT_SECS", 10)?),
            push_concurrency,

            auth_jwt_secret: env::var("AUTH_JWT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("AUTH_JWT_SECRET"))?
                .into_bytes(),
            trigger_secret: non_empty_var("PUSH_TRIGGER_SECRET"),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
