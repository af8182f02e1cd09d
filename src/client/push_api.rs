// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed client for the `/send-push` endpoint.

use crate::client::ClientError;
use crate::middleware::auth::TRIGGER_SECRET_HEADER;
use crate::models::{PushTrigger, SubscriptionInfo};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VapidKeyBody {
    public_key: String,
}

#[derive(Deserialize)]
struct SendBody {
    sent: u32,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Calls the push API the way the web app does.
#[derive(Debug, Clone)]
pub struct PushApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PushApiClient {
    /// `base_url` is the server root, e.g. `https://api.viewza.app`.
    pub fn new(base_url: &str) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/send-push", base_url.trim_end_matches('/')),
        }
    }

    /// Service public key for `applicationServerKey`.
    pub async fn vapid_public_key(&self) -> Result<String, ClientError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("action", "vapid-key")])
            .send()
            .await?;

        Ok(Self::parse::<VapidKeyBody>(response).await?.public_key)
    }

    /// Register a browser subscription for the token's user.
    pub async fn subscribe(
        &self,
        identity_token: &str,
        subscription: &SubscriptionInfo,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(identity_token)
            .json(&json!({ "action": "subscribe", "subscription": subscription }))
            .send()
            .await?;

        Self::parse::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn unsubscribe(&self, identity_token: &str, endpoint: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(identity_token)
            .json(&json!({ "action": "unsubscribe", "endpoint": endpoint }))
            .send()
            .await?;

        Self::parse::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Report an event; returns how many devices were reached.
    pub async fn trigger(
        &self,
        trigger: &PushTrigger,
        secret: Option<&str>,
    ) -> Result<u32, ClientError> {
        let mut request = self.http.post(&self.endpoint).json(trigger);
        if let Some(secret) = secret {
            request = request.header(TRIGGER_SECRET_HEADER, secret);
        }

        Ok(Self::parse::<SendBody>(request.send().await?).await?.sent)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
