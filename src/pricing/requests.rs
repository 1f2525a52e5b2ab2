//! Request DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::models::{CourtSpecification, CustomDimensions, SizeTier, Sport};

/// Request to compute a quotation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeQuotationRequest {
    pub sport: Sport,
    pub size_tier: SizeTier,
    #[serde(default)]
    pub custom_dimensions: Option<CustomDimensionsRequest>,
    #[serde(default)]
    pub add_ons: Vec<String>,
}

/// Court dimensions in metres
#[derive(Debug, Deserialize)]
pub struct CustomDimensionsRequest {
    #[serde(default)]
    pub length: Option<Decimal>,
    #[serde(default)]
    pub width: Option<Decimal>,
    /// Area computed by the form. Stored as submitted, never priced.
    #[serde(default)]
    pub area: Option<Decimal>,
}

impl From<ComputeQuotationRequest> for CourtSpecification {
    fn from(req: ComputeQuotationRequest) -> Self {
        CourtSpecification {
            sport: req.sport,
            size_tier: req.size_tier,
            custom_dimensions: req.custom_dimensions.map(|d| CustomDimensions {
                length: d.length,
                width: d.width,
                area: d.area,
            }),
            add_ons: req.add_ons,
        }
    }
}

/// Query for the advisory dimensions endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendedDimensionsQuery {
    pub sport: String,
}
