//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db;
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// Liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let database = match &state.db {
        Some(pool) => {
            db::ping(pool).await?;
            "connected"
        }
        None => "in-memory",
    };

    Ok(Json(HealthResponse {
        status: "OK",
        database,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
