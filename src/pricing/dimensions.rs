//! Court dimension resolution.
//!
//! Standard courts take the catalog's canonical area for the sport. Custom and
//! premium courts are always recomputed from length and width here; any area the
//! client computed is ignored.

use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use super::calculators::{round_money, MONEY_PLACES};
use super::models::{CourtSpecification, SizeTier};
use super::services::PricingError;

/// Length-to-width ratio of the advisory rectangle
const RECOMMENDED_ASPECT_RATIO: Decimal = dec!(1.5);

/// Area and tier a quotation is priced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDimensions {
    pub area: Decimal,
    pub size_tier: SizeTier,
}

/// Illustrative rectangle for a standard area. Never used in pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendedDimensions {
    pub length: Decimal,
    pub width: Decimal,
}

/// Resolve the priced area of a court request.
///
/// `standard_area` is the catalog's canonical area for the requested sport; it
/// is only consulted for the standard tier.
pub fn resolve_dimensions(
    spec: &CourtSpecification,
    standard_area: Option<Decimal>,
) -> Result<ResolvedDimensions, PricingError> {
    let area = match spec.size_tier {
        SizeTier::Standard => {
            let area = standard_area.ok_or_else(|| {
                PricingError::validation(
                    "sport",
                    format!("no standard court area is defined for {}", spec.sport),
                )
            })?;
            if area <= Decimal::ZERO {
                return Err(PricingError::Configuration {
                    message: format!("standard area for {} is not positive", spec.sport),
                    errors: vec![format!("court_standard_areas.{} = {}", spec.sport, area)],
                });
            }
            round_money(area, MONEY_PLACES)
        }
        SizeTier::Custom | SizeTier::Premium => resolve_custom_area(spec)?,
    };

    Ok(ResolvedDimensions {
        area,
        size_tier: spec.size_tier,
    })
}

fn resolve_custom_area(spec: &CourtSpecification) -> Result<Decimal, PricingError> {
    let dims = spec.custom_dimensions.as_ref().ok_or_else(|| {
        PricingError::validation(
            "customDimensions",
            format!("length and width are required for {} courts", spec.size_tier),
        )
    })?;

    let length = positive_dimension(dims.length, "customDimensions.length", "length")?;
    let width = positive_dimension(dims.width, "customDimensions.width", "width")?;

    let area = length.checked_mul(width).ok_or_else(|| {
        PricingError::validation("customDimensions", "area is too large to price")
    })?;
    let area = round_money(area, MONEY_PLACES);
    if area <= Decimal::ZERO {
        return Err(PricingError::validation(
            "customDimensions",
            format!("{} x {} rounds to an empty area", length, width),
        ));
    }
    Ok(area)
}

fn positive_dimension(
    value: Option<Decimal>,
    field: &str,
    name: &str,
) -> Result<Decimal, PricingError> {
    let value =
        value.ok_or_else(|| PricingError::validation(field, format!("{} is required", name)))?;
    if value <= Decimal::ZERO {
        return Err(PricingError::validation(
            field,
            format!("{} must be greater than zero, got {}", name, value),
        ));
    }
    Ok(value)
}

/// Derive a 1.5:1 rectangle with the given area, rounded to 0.1 m.
///
/// Returns `None` for non-positive areas.
pub fn recommended_dimensions(standard_area: Decimal) -> Option<RecommendedDimensions> {
    if standard_area <= Decimal::ZERO {
        return None;
    }
    let length = standard_area.checked_mul(RECOMMENDED_ASPECT_RATIO)?.sqrt()?;
    let width = (standard_area / RECOMMENDED_ASPECT_RATIO).sqrt()?;

    Some(RecommendedDimensions {
        length: round_money(length, 1),
        width: round_money(width, 1),
    })
}
