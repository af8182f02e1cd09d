// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Viewza: Web Push delivery and end-to-end message encryption
//!
//! The server side manages a single VAPID identity, stores browser push
//! subscriptions, and fans payload-less pushes out to them when the social
//! app reports an event. The client side (`client`) holds a device's
//! P-256 key and encrypts direct messages for a peer.

pub mod client;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use error::AppError;
use services::{PushService, PushSettings, VapidKeyManager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub push_service: PushService,
}

impl AppState {
    /// Wire the push stack on top of `db`.
    pub fn new(config: Config, db: FirestoreDb) -> Result<Self, AppError> {
        let vapid = Arc::new(VapidKeyManager::new(db.clone(), &config.vapid_subject));
        let push_service = PushService::new(db.clone(), vapid, PushSettings::from(&config))?;

        Ok(Self {
            config,
            db,
            push_service,
        })
    }
}
