//! Response DTOs for pricing API endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::models::{
    CourtSpecification, PriceBasis, QuotationLineItem, QuotationRecord, RateEntry, RateSnapshot,
};
use super::services::{CatalogOverview, DimensionAdvice};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

/// Court specification echoed back as submitted
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtSpecificationResponse {
    pub sport: String,
    pub size_tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_dimensions: Option<DimensionsResponse>,
    pub add_ons: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DimensionsResponse {
    #[serde(with = "rust_decimal::serde::str_option")]
    pub length: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub width: Option<Decimal>,
    /// Client-side area as submitted; never used for pricing
    #[serde(
        with = "rust_decimal::serde::str_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<Decimal>,
}

impl From<&CourtSpecification> for CourtSpecificationResponse {
    fn from(spec: &CourtSpecification) -> Self {
        Self {
            sport: spec.sport.to_string(),
            size_tier: spec.size_tier.to_string(),
            custom_dimensions: spec.custom_dimensions.as_ref().map(|d| DimensionsResponse {
                length: d.length,
                width: d.width,
                area: d.area,
            }),
            add_ons: spec.add_ons.clone(),
        }
    }
}

/// One priced component
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub code: String,
    pub label: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
}

impl From<&QuotationLineItem> for LineItemResponse {
    fn from(item: &QuotationLineItem) -> Self {
        Self {
            code: item.code.clone(),
            label: item.label.clone(),
            unit_rate: item.unit_rate,
            quantity: item.quantity,
            subtotal: item.subtotal,
        }
    }
}

/// Rates an issued quotation was priced with
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshotResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub base_area_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tier_multiplier: Decimal,
}

impl From<&RateSnapshot> for RateSnapshotResponse {
    fn from(snapshot: &RateSnapshot) -> Self {
        Self {
            base_area_rate: snapshot.base_area_rate,
            tier_multiplier: snapshot.tier_multiplier,
        }
    }
}

/// Response for an issued quotation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationResponse {
    pub id: Uuid,
    pub court_specification: CourtSpecificationResponse,
    pub size_tier: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub resolved_area: Decimal,
    pub line_items: Vec<LineItemResponse>,
    pub total: MoneyResponse,
    pub rate_snapshot: RateSnapshotResponse,
    pub rates_snapshot_version: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&QuotationRecord> for QuotationResponse {
    fn from(record: &QuotationRecord) -> Self {
        Self {
            id: record.id,
            court_specification: CourtSpecificationResponse::from(&record.court_specification),
            size_tier: record.size_tier.to_string(),
            resolved_area: record.resolved_area,
            line_items: record.line_items.iter().map(LineItemResponse::from).collect(),
            total: MoneyResponse {
                amount: record.total,
                currency: record.currency.clone(),
            },
            rate_snapshot: RateSnapshotResponse::from(&record.rate_snapshot),
            rates_snapshot_version: record.rates_snapshot_version,
            created_at: record.created_at,
        }
    }
}

/// Standard court size for one sport
#[derive(Debug, Serialize)]
pub struct CourtSizeResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub standard: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnResponse {
    pub code: String,
    pub label: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub basis: PriceBasis,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    pub sport: String,
    pub size_tier: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_area_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tier_multiplier: Decimal,
    pub currency: String,
    pub add_ons: Vec<AddOnResponse>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<&RateEntry> for RateResponse {
    fn from(entry: &RateEntry) -> Self {
        Self {
            sport: entry.sport.to_string(),
            size_tier: entry.size_tier.to_string(),
            base_area_rate: entry.base_area_rate,
            tier_multiplier: entry.tier_multiplier,
            currency: entry.currency.clone(),
            add_ons: entry
                .add_on_prices
                .iter()
                .map(|(code, price)| AddOnResponse {
                    code: code.clone(),
                    label: price.label.clone(),
                    amount: price.amount,
                    basis: price.basis,
                })
                .collect(),
            version: entry.version,
            updated_at: entry.updated_at,
        }
    }
}

/// Response for the catalog overview
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub court_sizes: BTreeMap<String, CourtSizeResponse>,
    pub rates: Vec<RateResponse>,
}

impl From<&CatalogOverview> for CatalogResponse {
    fn from(overview: &CatalogOverview) -> Self {
        Self {
            court_sizes: overview
                .standard_areas
                .iter()
                .map(|(sport, area)| (sport.to_string(), CourtSizeResponse { standard: *area }))
                .collect(),
            rates: overview.rates.iter().map(RateResponse::from).collect(),
        }
    }
}

/// Advisory rectangle for a standard court. Not a price input.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedDimensionsResponse {
    pub sport: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub standard_area: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub length: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub width: Decimal,
}

impl From<&DimensionAdvice> for RecommendedDimensionsResponse {
    fn from(advice: &DimensionAdvice) -> Self {
        Self {
            sport: advice.sport.to_string(),
            standard_area: advice.standard_area,
            length: advice.recommended.length,
            width: advice.recommended.width,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
