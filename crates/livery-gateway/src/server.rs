// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Public routes carry
//! the customer-facing flows; the `/v1` admin group sits behind bearer
//! auth.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use livery_config::SiteConfig;
use livery_core::LiveryError;
use livery_notify::Notifier;
use livery_storage::Database;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub notifier: Notifier,
    /// Marketing-site settings; confirmation redirects land there.
    pub site: SiteConfig,
    /// Public base URL of this API, used for confirm links in emails.
    pub confirm_base: String,
    pub auth: AuthConfig,
}

/// Assemble the full route tree.
pub fn build_router(state: AppState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/quotes", post(handlers::post_quote))
        .route("/confirm", get(handlers::get_confirm))
        .route("/v1/subscriptions", post(handlers::post_subscription))
        .route(
            "/v1/subscriptions/{email}",
            delete(handlers::delete_subscription),
        )
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/v1/segments/{segment}", get(handlers::get_segment))
        .route(
            "/v1/audiences",
            post(handlers::post_audience).get(handlers::get_audiences),
        )
        .route("/v1/audiences/{id}", get(handlers::get_audience))
        .route(
            "/v1/campaigns",
            post(handlers::post_campaign).get(handlers::get_campaigns),
        )
        .route("/v1/campaigns/{id}", get(handlers::get_campaign))
        .route("/v1/campaigns/{id}/send", post(handlers::post_campaign_send))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), LiveryError> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LiveryError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| LiveryError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
