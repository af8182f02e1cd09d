// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Viewza push API server.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use viewza::{
    config::{Config, StorageBackend},
    db::FirestoreDb,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, storage = ?config.storage, "Starting Viewza push API");

    let db = match config.storage {
        StorageBackend::Firestore => FirestoreDb::new(&config.gcp_project_id).await?,
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            FirestoreDb::new_in_memory()
        }
    };

    if config.trigger_secret.is_none() {
        tracing::warn!("PUSH_TRIGGER_SECRET not set; trigger calls are unauthenticated");
    }

    let state = Arc::new(AppState::new(config.clone(), db)?);

    // Create the VAPID identity up front so the first push doesn't pay for it.
    match state.push_service.vapid().public_key().await {
        Ok(public_key) => tracing::info!(public_key = %public_key, "VAPID keypair ready"),
        Err(e) => tracing::warn!(error = %e, "VAPID keypair not available yet"),
    }

    let app = viewza::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("viewza=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
