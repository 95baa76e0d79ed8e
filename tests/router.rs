mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use restaurant_api::{
    app::build_router, config::AppConfig, models::UserRole, services::auth_service::issue_token,
    state::AppState,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use common::test_config;

// The pool never connects; these requests are all answered before any query runs.
fn app() -> anyhow::Result<(Router, AppConfig)> {
    let config = test_config("postgres://localhost/unused");
    let pool = PgPoolOptions::new().connect_lazy(&config.database_url)?;
    let router = build_router(AppState::new(pool, config.clone()))?;
    Ok((router, config))
}

async fn json_body(body: Body) -> anyhow::Result<serde_json::Value> {
    let bytes = to_bytes(body, usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let (app, _) = app()?;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> anyhow::Result<()> {
    let (app, _) = app()?;
    let response = app
        .oneshot(Request::get("/api/users/profile").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response.into_body()).await?;
    let error = body["data"]["error"].as_str().unwrap_or_default();
    assert!(error.contains("Missing Authorization header"), "{error}");
    Ok(())
}

#[tokio::test]
async fn token_signed_elsewhere_is_unauthorized() -> anyhow::Result<()> {
    let (app, config) = app()?;
    let foreign = AppConfig {
        jwt_secret: "another-secret".into(),
        ..config
    };
    let token = issue_token(&foreign, Uuid::new_v4(), UserRole::Waiter)?;

    let response = app
        .oneshot(
            Request::get("/api/restaurants")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_order_body_is_rejected_before_placement() -> anyhow::Result<()> {
    let (app, config) = app()?;
    let token = issue_token(&config, Uuid::new_v4(), UserRole::Customer)?;

    let response = app
        .oneshot(
            Request::post(format!("/api/orders/{}", Uuid::new_v4()))
                .header(header::AUTHORIZATION, token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"items": "two soups"}"#))?,
        )
        .await?;

    assert!(response.status().is_client_error());
    Ok(())
}

#[tokio::test]
async fn bad_restaurant_id_is_bad_request() -> anyhow::Result<()> {
    let (app, config) = app()?;
    let token = issue_token(&config, Uuid::new_v4(), UserRole::Customer)?;

    let response = app
        .oneshot(
            Request::get("/api/menu/not-a-uuid")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_route_falls_back_to_not_found() -> anyhow::Result<()> {
    let (app, _) = app()?;
    let response = app
        .oneshot(Request::get("/api/nowhere").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response.into_body()).await?;
    assert_eq!(body["data"]["path"], "/api/nowhere");
    Ok(())
}
