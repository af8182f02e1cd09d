// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Web Push delivery.
//!
//! Pushes carry no payload: each one is a "wake up and fetch" signal. A
//! delivery fans out to every subscription of the recipient:
//! - 200/201: delivered
//! - 404/410: endpoint is permanently gone, subscription deleted
//! - anything else (status, network error, timeout): logged and kept,
//!   the next triggering event is the retry

use crate::config::Config;
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::profile::actor_name;
use crate::models::{PushSubscription, PushTrigger, SubscriptionInfo};
use crate::services::assertion::{authorization_header, sign_assertion};
use crate::services::vapid::{VapidKeyManager, VapidKeys};
use crate::time_utils::now_rfc3339;
use futures_util::{stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Delivery tuning, taken from [`Config`].
#[derive(Debug, Clone)]
pub struct PushSettings {
    /// Seconds the push service should retain an undelivered message
    pub ttl_secs: u32,
    /// Per-endpoint request timeout
    pub timeout: Duration,
    /// Endpoints contacted concurrently
    pub concurrency: usize,
}

impl From<&Config> for PushSettings {
    fn from(config: &Config) -> Self {
        Self {
            ttl_secs: config.push_ttl_secs,
            timeout: config.push_timeout,
            concurrency: config.push_concurrency.max(1),
        }
    }
}

/// What happened to one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// Endpoint reported gone; subscription removed
    Gone,
    /// Transient or unknown failure; subscription kept
    Failed,
}

impl DeliveryOutcome {
    /// Classify a push service response status.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK | StatusCode::CREATED => Self::Sent,
            StatusCode::NOT_FOUND | StatusCode::GONE => Self::Gone,
            _ => Self::Failed,
        }
    }
}

/// Result of fanning one trigger out to a user's subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: u32,
    pub pruned: u32,
    pub failed: u32,
    /// Human-readable line for the event, e.g. "ana liked your post"
    pub message: Option<String>,
}

/// Push subscription lifecycle and delivery.
#[derive(Clone)]
pub struct PushService {
    db: FirestoreDb,
    vapid: Arc<VapidKeyManager>,
    http: reqwest::Client,
    settings: PushSettings,
}

impl PushService {
    pub fn new(
        db: FirestoreDb,
        vapid: Arc<VapidKeyManager>,
        settings: PushSettings,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(db, vapid, http, settings))
    }

    /// Use a preconfigured HTTP client (custom resolvers, proxies, tests).
    pub fn with_http_client(
        db: FirestoreDb,
        vapid: Arc<VapidKeyManager>,
        http: reqwest::Client,
        settings: PushSettings,
    ) -> Self {
        Self {
            db,
            vapid,
            http,
            settings,
        }
    }

    pub fn vapid(&self) -> &VapidKeyManager {
        &self.vapid
    }

    /// Register (or refresh the keys of) a browser subscription.
    pub async fn subscribe(
        &self,
        user_id: &str,
        info: &SubscriptionInfo,
    ) -> Result<PushSubscription, AppError> {
        let sub = PushSubscription::new(user_id, info, now_rfc3339());
        self.db.upsert_subscription(&sub).await?;

        tracing::info!(user_id, subscription_id = %sub.id, "Push subscription saved");
        Ok(sub)
    }

    /// Remove a user's subscription for `endpoint`. Unknown endpoints are a no-op.
    pub async fn unsubscribe(&self, user_id: &str, endpoint: &str) -> Result<(), AppError> {
        self.db
            .delete_subscription_for_endpoint(user_id, endpoint)
            .await?;

        tracing::info!(user_id, "Push subscription removed");
        Ok(())
    }

    /// Deliver one event to every subscription of `trigger.user_id`.
    ///
    /// Partial failure is a normal outcome and is reported in the counts.
    /// Only failing to list subscriptions or to obtain the VAPID keys
    /// fails the call.
    pub async fn deliver(&self, trigger: &PushTrigger) -> Result<DeliveryReport, AppError> {
        let subscriptions = self.db.list_subscriptions(&trigger.user_id).await?;
        if subscriptions.is_empty() {
            tracing::debug!(user_id = %trigger.user_id, "No push subscriptions");
            return Ok(DeliveryReport::default());
        }

        let actor = match self.db.get_profile(&trigger.actor_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    actor_id = %trigger.actor_id,
                    error = %e,
                    "Failed to load actor profile, using fallback name"
                );
                None
            }
        };
        let message = trigger.message(actor_name(actor.as_ref()));

        let keys = self.vapid.get_or_create_keys().await?;

        let sent = AtomicU32::new(0);
        let pruned = AtomicU32::new(0);
        let failed = AtomicU32::new(0);

        {
            let (keys, sent, pruned, failed) = (&keys, &sent, &pruned, &failed);
            stream::iter(&subscriptions)
                .for_each_concurrent(self.settings.concurrency, |sub| async move {
                    let counter = match self.send_to_subscription(keys, sub).await {
                        DeliveryOutcome::Sent => sent,
                        DeliveryOutcome::Gone => pruned,
                        DeliveryOutcome::Failed => failed,
                    };
                    counter.fetch_add(1, Ordering::Relaxed);
                })
                .await;
        }

        let report = DeliveryReport {
            sent: sent.into_inner(),
            pruned: pruned.into_inner(),
            failed: failed.into_inner(),
            message: Some(message),
        };

        tracing::info!(
            user_id = %trigger.user_id,
            kind = trigger.kind.as_str(),
            subscriptions = subscriptions.len(),
            sent = report.sent,
            pruned = report.pruned,
            failed = report.failed,
            message = report.message.as_deref().unwrap_or_default(),
            "Push delivery complete"
        );

        Ok(report)
    }

    /// Sign a fresh assertion and POST an empty push to one endpoint.
    async fn send_to_subscription(&self, keys: &VapidKeys, sub: &PushSubscription) -> DeliveryOutcome {
        let jwt = match sign_assertion(keys, &sub.endpoint) {
            Ok(jwt) => jwt,
            Err(e) => {
                tracing::warn!(
                    subscription_id = %sub.id,
                    error = %e,
                    "Failed to sign VAPID assertion"
                );
                return DeliveryOutcome::Failed;
            }
        };

        let response = self
            .http
            .post(&sub.endpoint)
            .header(AUTHORIZATION, authorization_header(&jwt, &keys.public_key))
            .header(CONTENT_LENGTH, "0")
            .header("TTL", self.settings.ttl_secs.to_string())
            .timeout(self.settings.timeout)
            .body(Vec::new())
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    subscription_id = %sub.id,
                    timeout = e.is_timeout(),
                    error = %e,
                    "Push request failed"
                );
                return DeliveryOutcome::Failed;
            }
        };

        let status = response.status();
        // Drain the body so the connection can be reused.
        let _ = response.bytes().await;

        match DeliveryOutcome::from_status(status) {
            DeliveryOutcome::Sent => {
                tracing::debug!(subscription_id = %sub.id, status = %status, "Push delivered");
                DeliveryOutcome::Sent
            }
            // Only counts as pruned once the subscription is really gone.
            DeliveryOutcome::Gone => match self.db.delete_subscription(&sub.id).await {
                Ok(()) => {
                    tracing::info!(
                        subscription_id = %sub.id,
                        status = %status,
                        "Deleted stale push subscription"
                    );
                    DeliveryOutcome::Gone
                }
                Err(e) => {
                    tracing::warn!(
                        subscription_id = %sub.id,
                        error = %e,
                        "Failed to delete stale push subscription"
                    );
                    DeliveryOutcome::Failed
                }
            },
            DeliveryOutcome::Failed => {
                tracing::warn!(
                    subscription_id = %sub.id,
                    status = %status,
                    "Push service rejected delivery"
                );
                DeliveryOutcome::Failed
            }
        }
    }
}
