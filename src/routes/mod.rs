//! Plumbing routes that sit beside the pricing API

pub mod health;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health::health))
}
