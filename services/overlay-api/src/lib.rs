//! Demo host for the overlay protocol.
//!
//! Stands in for a map renderer: every request for
//! `/tiles/<scheme>/<path>` is turned into `<scheme>://<path>` and dispatched
//! through the shared [`ProtocolRegistry`].

pub mod handlers;

use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use protocol::ProtocolRegistry;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// Build the router around a populated registry.
pub fn app(registry: Arc<ProtocolRegistry>) -> Router {
    Router::new()
        .route("/tiles/:scheme/*path", get(handlers::tile_handler))
        .route("/api/protocols", get(handlers::protocols_handler))
        .route("/api/legend/:scheme", get(handlers::legend_handler))
        .route("/health", get(handlers::health_handler))
        .layer(Extension(registry))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
