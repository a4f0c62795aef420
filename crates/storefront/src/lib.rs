//! Satchel storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Architecture
//!
//! - [`catalog`] - immutable product catalog and filter engine
//! - [`store`] - per-shopper cart, wishlist, browsing history and cached user
//! - [`shoppers`] - registry mapping browser sessions to loaded state
//! - [`services`] - checkout, identity provider and recommendations
//! - [`claude`] - Anthropic Messages API client
//! - [`routes`] - JSON HTTP API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod claude;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shoppers;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the full storefront router.
///
/// `rate_limited` enables the per-IP governors; the binary always passes
/// `true`. Sentry layers are added by the binary around the result.
pub fn router(state: AppState, rate_limited: bool) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(rate_limited))
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. The storefront has no database to
/// probe; external services are checked lazily per request.
async fn health() -> &'static str {
    "ok"
}
