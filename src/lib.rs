//! Court quotation service.
//!
//! Prices sports-court construction requests and keeps issued quotations as
//! immutable snapshots.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod pricing;
pub mod routes;

use axum::Router;
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::pricing::QuotationEngine;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: QuotationEngine,
    /// `None` when running against in-memory stores
    pub db: Option<PgPool>,
}

/// Build the full HTTP application
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(pricing::router())
        .merge(routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
