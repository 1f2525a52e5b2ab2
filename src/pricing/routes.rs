//! HTTP routes for quotations and the rate catalog.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::AppState;

use super::models::{CourtSpecification, ParseEnumError, Sport};
use super::requests::{ComputeQuotationRequest, RecommendedDimensionsQuery};
use super::responses::{
    CatalogResponse, PricingErrorResponse, QuotationResponse, RecommendedDimensionsResponse,
};
use super::services::PricingError;

/// Pricing routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/quotations", post(create_quotation))
        .route("/api/quotations/:id", get(get_quotation))
        .route("/api/pricing", get(get_catalog))
        .route("/api/pricing/recommended-dimensions", get(recommended_dimensions))
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let status = match &self {
            PricingError::Validation { .. } => StatusCode::BAD_REQUEST,
            PricingError::QuotationNotFound { .. } => StatusCode::NOT_FOUND,
            PricingError::MissingRate { .. } | PricingError::Configuration { .. } => {
                tracing::error!("Pricing configuration fault: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PricingError::Storage(e) => {
                tracing::error!("Pricing storage failure: {}", e);
                if e.is_retryable() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        };

        // Only input errors carry details; configuration faults stay in the logs
        let details = match &self {
            PricingError::Validation { field, reason } => {
                Some(json!({ "field": field, "reason": reason }))
            }
            _ => None,
        };

        let message = match &self {
            PricingError::Validation { .. } | PricingError::QuotationNotFound { .. } => {
                self.to_string()
            }
            PricingError::MissingRate { .. } | PricingError::Configuration { .. } => {
                "Pricing is temporarily unavailable".to_string()
            }
            PricingError::Storage(_) => {
                "Quotation storage is unavailable, please retry".to_string()
            }
        };

        let body = PricingErrorResponse {
            error_type: self.error_type().to_string(),
            message,
            retryable: self.is_retryable(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Compute and persist a quotation
async fn create_quotation(
    State(state): State<AppState>,
    payload: Result<Json<ComputeQuotationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<QuotationResponse>), PricingError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected quotation body: {}", rejection.body_text());
        PricingError::validation("body", rejection.body_text())
    })?;

    let record = state
        .engine
        .compute(CourtSpecification::from(request))
        .await?;

    Ok((StatusCode::CREATED, Json(QuotationResponse::from(&record))))
}

/// Fetch an issued quotation snapshot
async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuotationResponse>, PricingError> {
    let id = Uuid::parse_str(&id)
        .map_err(|e| PricingError::validation("id", format!("not a valid quotation id: {}", e)))?;

    let record = state.engine.get_by_id(id).await?;
    Ok(Json(QuotationResponse::from(&record)))
}

/// Current standard areas and rates
async fn get_catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>, PricingError> {
    let overview = state.engine.catalog_overview().await?;
    Ok(Json(CatalogResponse::from(&overview)))
}

/// Advisory dimensions for a sport's standard court
async fn recommended_dimensions(
    State(state): State<AppState>,
    Query(query): Query<RecommendedDimensionsQuery>,
) -> Result<Json<RecommendedDimensionsResponse>, PricingError> {
    let sport: Sport = query
        .sport
        .parse()
        .map_err(|e: ParseEnumError| PricingError::validation("sport", e.to_string()))?;

    let advice = state.engine.recommended_dimensions(sport).await?;
    Ok(Json(RecommendedDimensionsResponse::from(&advice)))
}
