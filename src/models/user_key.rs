// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Public-key directory record for end-to-end encryption.

use serde::{Deserialize, Serialize};

/// One record per user (document ID = user_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKeyRecord {
    pub user_id: String,
    /// Raw uncompressed P-256 point, standard base64
    pub public_key: String,
    /// Last upsert (RFC 3339)
    pub updated_at: String,
}
