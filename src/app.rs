//! Relay HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures tracing middleware, and defines the
//! shared application state injected into handlers.
//!
//! # Notes
//! The state holds the only two shared resources in the process: the store
//! handle and the fan-out dispatcher. Both are established once at startup
//! and never mutated afterwards, so handlers need no locking around them.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::dispatch::Dispatcher;
use crate::store::SubscriptionStore;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubscriptionStore>,
    pub dispatcher: Dispatcher,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    // Method fallbacks keep wrong-method requests on the same 404 shape as
    // unknown paths instead of axum's default 405.
    Router::new()
        .route(
            "/subscribe/:topic",
            axum::routing::post(api::subscribe::subscribe).fallback(api::not_found),
        )
        .route(
            "/publish/:topic",
            axum::routing::post(api::publish::publish).fallback(api::not_found),
        )
        .route(
            "/subscribers/:tag",
            axum::routing::post(api::system::subscriber_echo).fallback(api::not_found),
        )
        .route(
            "/healthz",
            axum::routing::get(api::system::health).fallback(api::not_found),
        )
        .merge(utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .fallback(api::not_found)
        .layer(trace_layer)
        .with_state(state)
}
