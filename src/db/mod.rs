//! Database layer (Firestore, with an in-memory stand-in).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

/// Collection names as constants.
pub mod collections {
    /// VAPID keypair singleton (document `default`)
    pub const PUSH_CONFIG: &str = "push_config";
    pub const PUSH_SUBSCRIPTIONS: &str = "push_subscriptions";
    /// Written by the social app; read for actor names
    pub const PROFILES: &str = "profiles";
    /// Public-key directory for end-to-end encryption
    pub const USER_KEYS: &str = "user_keys";
}

/// Fixed document ID of the VAPID keypair.
pub const VAPID_CONFIG_ID: &str = "default";
