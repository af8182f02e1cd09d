// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Push endpoint.
//!
//! One path, dispatched on method and `action`:
//! - `GET ?action=vapid-key`: public VAPID key for browsers
//! - `POST {"action":"subscribe"}`: save the caller's subscription
//! - `POST {"action":"unsubscribe"}`: remove the caller's subscription
//! - `POST {"user_id","type","actor_id"}`: internal trigger, deliver a push

use crate::error::AppError;
use crate::middleware::{authenticate, verify_trigger};
use crate::models::{PushTrigger, SubscriptionInfo};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Push routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/send-push", get(get_action).post(post_action))
}

#[derive(Deserialize)]
struct ActionQuery {
    action: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SendResponse {
    pub ok: bool,
    pub sent: u32,
}

#[derive(Deserialize)]
struct SubscribeRequest {
    subscription: SubscriptionInfo,
}

#[derive(Deserialize)]
struct UnsubscribeRequest {
    endpoint: String,
}

async fn get_action(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActionQuery>,
) -> Result<Json<VapidKeyResponse>, AppError> {
    if query.action.as_deref() != Some("vapid-key") {
        return Err(AppError::InvalidAction);
    }

    let public_key = state.push_service.vapid().public_key().await?;
    Ok(Json(VapidKeyResponse { public_key }))
}

async fn post_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    match body.get("action").and_then(Value::as_str) {
        Some("subscribe") => Ok(subscribe(&state, &headers, body).await?.into_response()),
        Some("unsubscribe") => Ok(unsubscribe(&state, &headers, body).await?.into_response()),
        _ => Ok(trigger(&state, &headers, body).await?.into_response()),
    }
}

async fn subscribe(
    state: &AppState,
    headers: &HeaderMap,
    body: Value,
) -> Result<Json<OkResponse>, AppError> {
    let user = authenticate(headers, &state.config)?;

    let request: SubscribeRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid subscription: {}", e)))?;
    request
        .subscription
        .validate()
        .map_err(AppError::BadRequest)?;

    state
        .push_service
        .subscribe(&user.user_id, &request.subscription)
        .await?;

    Ok(Json(OkResponse { ok: true }))
}

async fn unsubscribe(
    state: &AppState,
    headers: &HeaderMap,
    body: Value,
) -> Result<Json<OkResponse>, AppError> {
    let user = authenticate(headers, &state.config)?;

    let request: UnsubscribeRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Missing endpoint: {}", e)))?;

    state
        .push_service
        .unsubscribe(&user.user_id, &request.endpoint)
        .await?;

    Ok(Json(OkResponse { ok: true }))
}

async fn trigger(
    state: &AppState,
    headers: &HeaderMap,
    body: Value,
) -> Result<Json<SendResponse>, AppError> {
    let trigger: PushTrigger = match serde_json::from_value(body) {
        Ok(trigger) => trigger,
        Err(_) => return Err(AppError::InvalidAction),
    };
    if !trigger.is_well_formed() {
        return Err(AppError::InvalidAction);
    }

    verify_trigger(headers, &state.config)?;

    let report = state.push_service.deliver(&trigger).await?;
    Ok(Json(SendResponse {
        ok: true,
        sent: report.sent,
    }))
}
