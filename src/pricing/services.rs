//! Quotation service with catalog and store access.
//!
//! The engine resolves dimensions, reads one rate entry, prices every line and
//! only then persists the snapshot. Issued quotations are read back from the
//! store as-is and are never re-priced against the live catalog.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::price_quotation;
use super::catalog::RateCatalog;
use super::dimensions::{recommended_dimensions, resolve_dimensions, RecommendedDimensions};
use super::models::{CourtSpecification, QuotationRecord, RateEntry, RateSnapshot, SizeTier, Sport};
use super::store::QuotationStore;

/// Pricing calculation error types
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// Bad input; the caller can fix it
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The catalog lacks an entry for a supported pair
    #[error("No active rate entry for {sport} / {tier}")]
    MissingRate { sport: Sport, tier: SizeTier },

    #[error("Configuration error: {message}")]
    Configuration { message: String, errors: Vec<String> },

    #[error("Quotation {id} not found")]
    QuotationNotFound { id: Uuid },

    #[error("Storage error: {0}")]
    Storage(#[from] AppError),
}

impl PricingError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable category
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::Validation { .. } => "validation_error",
            PricingError::MissingRate { .. } | PricingError::Configuration { .. } => {
                "configuration_error"
            }
            PricingError::QuotationNotFound { .. } => "not_found",
            PricingError::Storage(_) => "storage_error",
        }
    }

    /// Only storage failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, PricingError::Storage(e) if e.is_retryable())
    }
}

/// Advisory dimensions for a sport's standard court
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionAdvice {
    pub sport: Sport,
    pub standard_area: Decimal,
    pub recommended: RecommendedDimensions,
}

/// Current catalog contents
#[derive(Debug, Clone)]
pub struct CatalogOverview {
    pub standard_areas: Vec<(Sport, Decimal)>,
    pub rates: Vec<RateEntry>,
}

/// Computes and serves quotations
#[derive(Clone)]
pub struct QuotationEngine {
    catalog: Arc<dyn RateCatalog>,
    store: Arc<dyn QuotationStore>,
    store_timeout: Duration,
}

impl QuotationEngine {
    pub fn new(
        catalog: Arc<dyn RateCatalog>,
        store: Arc<dyn QuotationStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            store_timeout,
        }
    }

    /// Price a court request and persist the resulting quotation.
    ///
    /// Validation and catalog failures are detected before anything is
    /// written. If the write fails, no record is returned.
    pub async fn compute(&self, spec: CourtSpecification) -> Result<QuotationRecord, PricingError> {
        let standard_area = if spec.size_tier.uses_custom_dimensions() {
            None
        } else {
            self.timed(self.catalog.standard_area(spec.sport)).await?
        };

        let resolved = resolve_dimensions(&spec, standard_area).inspect_err(|e| {
            warn!(
                sport = %spec.sport,
                size_tier = %spec.size_tier,
                "Rejected court request: {}",
                e
            );
        })?;

        let rate = self
            .timed(self.catalog.get_rate(spec.sport, resolved.size_tier))
            .await?
            .ok_or_else(|| {
                error!(
                    sport = %spec.sport,
                    size_tier = %resolved.size_tier,
                    "Rate catalog is missing an entry"
                );
                PricingError::MissingRate {
                    sport: spec.sport,
                    tier: resolved.size_tier,
                }
            })?;

        if let Err(errors) = rate.validate() {
            error!(sport = %rate.sport, size_tier = %rate.size_tier, ?errors, "Invalid rate entry");
            return Err(PricingError::Configuration {
                message: format!("rate entry {} / {} is invalid", rate.sport, rate.size_tier),
                errors,
            });
        }

        let priced = price_quotation(
            spec.sport,
            resolved.size_tier,
            resolved.area,
            &rate,
            &spec.add_ons,
        )
        .inspect_err(|e| warn!(sport = %spec.sport, "Rejected add-on selection: {}", e))?;

        let record = QuotationRecord {
            id: Uuid::new_v4(),
            size_tier: resolved.size_tier,
            resolved_area: resolved.area,
            line_items: priced.line_items,
            total: priced.total,
            currency: rate.currency.clone(),
            rate_snapshot: RateSnapshot {
                base_area_rate: rate.base_area_rate,
                tier_multiplier: rate.tier_multiplier,
            },
            rates_snapshot_version: rate.version,
            created_at: Utc::now(),
            court_specification: spec,
        };

        self.timed(self.store.insert(&record)).await.inspect_err(|e| {
            error!(quotation_id = %record.id, "Failed to persist quotation: {}", e);
        })?;

        info!(
            quotation_id = %record.id,
            sport = %record.court_specification.sport,
            size_tier = %record.size_tier,
            area = %record.resolved_area,
            total = %record.total,
            rates_version = record.rates_snapshot_version,
            "Quotation issued"
        );

        Ok(record)
    }

    /// Fetch an issued quotation exactly as it was stored
    pub async fn get_by_id(&self, id: Uuid) -> Result<QuotationRecord, PricingError> {
        self.timed(self.store.get(id))
            .await?
            .ok_or(PricingError::QuotationNotFound { id })
    }

    /// Illustrative 1.5:1 rectangle for the sport's standard area
    pub async fn recommended_dimensions(
        &self,
        sport: Sport,
    ) -> Result<DimensionAdvice, PricingError> {
        let standard_area = self
            .timed(self.catalog.standard_area(sport))
            .await?
            .ok_or_else(|| {
                PricingError::validation(
                    "sport",
                    format!("no standard court area is defined for {}", sport),
                )
            })?;

        let recommended = recommended_dimensions(standard_area).ok_or_else(|| {
            PricingError::Configuration {
                message: format!("standard area for {} is not positive", sport),
                errors: vec![format!("court_standard_areas.{} = {}", sport, standard_area)],
            }
        })?;

        Ok(DimensionAdvice {
            sport,
            standard_area,
            recommended,
        })
    }

    pub async fn catalog_overview(&self) -> Result<CatalogOverview, PricingError> {
        let standard_areas = self.timed(self.catalog.list_standard_areas()).await?;
        let rates = self.timed(self.catalog.list_rates()).await?;
        Ok(CatalogOverview {
            standard_areas,
            rates,
        })
    }

    /// Bound an external call by the configured store timeout
    async fn timed<T, F>(&self, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| AppError::Timeout(self.store_timeout))?
    }
}
