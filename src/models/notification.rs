// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Notification triggers and the phrases they produce.

use serde::{Deserialize, Serialize};

/// Kind of social event that triggers a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Message,
    Other(String),
}

impl From<String> for NotificationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "like" => Self::Like,
            "comment" => Self::Comment,
            "follow" => Self::Follow,
            "message" => Self::Message,
            _ => Self::Other(value),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Follow => "follow",
            Self::Message => "message",
            Self::Other(other) => other,
        }
    }

    /// Verb phrase following the actor's name.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Like => "liked your post",
            Self::Comment => "commented on your post",
            Self::Follow => "started following you",
            Self::Message => "sent you a message",
            Self::Other(_) => "sent you a notification",
        }
    }
}

/// Inbound delivery request from an event source (e.g. a database trigger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTrigger {
    /// Recipient
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// User whose action caused the event
    pub actor_id: String,
}

impl PushTrigger {
    /// All three fields must be present and non-empty.
    pub fn is_well_formed(&self) -> bool {
        !self.user_id.trim().is_empty()
            && !self.kind.as_str().trim().is_empty()
            && !self.actor_id.trim().is_empty()
    }

    /// Human-readable line, e.g. "ana liked your post".
    pub fn message(&self, actor_name: &str) -> String {
        format!("{} {}", actor_name, self.kind.phrase())
    }
}
