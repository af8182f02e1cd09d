// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use viewza::error::AppError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_client_errors_render_fixed_messages() {
    assert_eq!(
        render(AppError::Unauthorized).await,
        (StatusCode::UNAUTHORIZED, serde_json::json!({"error": "Unauthorized"}))
    );
    assert_eq!(
        render(AppError::InvalidAction).await,
        (StatusCode::BAD_REQUEST, serde_json::json!({"error": "Invalid action"}))
    );
    assert_eq!(render(AppError::Forbidden).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_server_errors_carry_message() {
    let (status, body) = render(AppError::Database("store unavailable".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "store unavailable");

    let (status, body) = render(AppError::Internal(anyhow::anyhow!("boom"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "boom");
}
