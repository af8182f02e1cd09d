// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod assertion;
pub mod push;
pub mod vapid;

pub use assertion::{sign_assertion, AssertionError, VapidClaims};
pub use push::{DeliveryOutcome, DeliveryReport, PushService, PushSettings};
pub use vapid::{VapidKeyManager, VapidKeys};
