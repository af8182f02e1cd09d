// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod notification;
pub mod profile;
pub mod push;
pub mod user_key;

pub use notification::{NotificationKind, PushTrigger};
pub use profile::Profile;
pub use push::{PushSubscription, SubscriptionInfo, SubscriptionKeys, VapidConfigRecord};
pub use user_key::UserKeyRecord;
