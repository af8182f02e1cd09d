// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `PushApiClient` against a live server on 127.0.0.1.

use std::sync::Arc;
use viewza::client::{ClientError, PushApiClient};
use viewza::config::Config;
use viewza::db::FirestoreDb;
use viewza::models::{NotificationKind, PushTrigger};
use viewza::AppState;

mod common;
use common::{create_test_app_with, create_test_jwt, sample_subscription};

async fn serve(config: Config) -> (PushApiClient, Arc<AppState>) {
    let (app, state) = create_test_app_with(config, FirestoreDb::new_in_memory());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (PushApiClient::new(&format!("http://{}/", addr)), state)
}

#[tokio::test]
async fn test_client_fetches_vapid_key() {
    let (client, state) = serve(Config::default()).await;

    let key = client.vapid_public_key().await.unwrap();
    assert_eq!(key, state.push_service.vapid().public_key().await.unwrap());
}

#[tokio::test]
async fn test_client_subscribe_lifecycle() {
    let (client, state) = serve(Config::default()).await;
    let token = create_test_jwt("bob");
    let subscription = sample_subscription("https://push.example/bob-phone");

    client.subscribe(&token, &subscription).await.unwrap();
    assert_eq!(state.db.list_subscriptions("bob").await.unwrap().len(), 1);

    client
        .unsubscribe(&token, &subscription.endpoint)
        .await
        .unwrap();
    assert!(state.db.list_subscriptions("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_surfaces_api_errors() {
    let (client, _) = serve(Config::default()).await;
    let subscription = sample_subscription("https://push.example/bob-phone");

    match client.subscribe("bogus", &subscription).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected 401, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_trigger_with_secret() {
    let config = Config {
        trigger_secret: Some("s3cret".to_string()),
        ..Config::default()
    };
    let (client, _) = serve(config).await;
    let trigger = PushTrigger {
        user_id: "bob".to_string(),
        kind: NotificationKind::Comment,
        actor_id: "ana".to_string(),
    };

    assert!(matches!(
        client.trigger(&trigger, None).await,
        Err(ClientError::Api { status: 403, .. })
    ));
    assert_eq!(client.trigger(&trigger, Some("s3cret")).await.unwrap(), 0);
}
