// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Public profile model (owned by the social app, read here for names).

use serde::{Deserialize, Serialize};

/// Shown when an actor has no profile or no usable name.
pub const FALLBACK_ACTOR_NAME: &str = "Someone";

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Auth user ID (also used as document ID)
    pub user_id: String,
    /// Unique handle
    pub username: String,
    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Profile {
    /// Display name if set, else the username.
    pub fn display_identity(&self) -> &str {
        [self.display_name.as_deref(), Some(self.username.as_str())]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_ACTOR_NAME)
    }
}

/// Name to show for an actor who may not have a profile.
pub fn actor_name(profile: Option<&Profile>) -> &str {
    profile
        .map(Profile::display_identity)
        .unwrap_or(FALLBACK_ACTOR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(username: &str, display_name: Option<&str>) -> Profile {
        Profile {
            user_id: "u1".to_string(),
            username: username.to_string(),
            display_name: display_name.map(String::from),
        }
    }

    #[test]
    fn test_actor_name_prefers_display_name() {
        assert_eq!(actor_name(Some(&profile("ana", Some("Ana B")))), "Ana B");
        assert_eq!(actor_name(Some(&profile("ana", Some("  ")))), "ana");
        assert_eq!(actor_name(Some(&profile("ana", None))), "ana");
        assert_eq!(actor_name(Some(&profile("", None))), FALLBACK_ACTOR_NAME);
        assert_eq!(actor_name(None), FALLBACK_ACTOR_NAME);
    }
}
