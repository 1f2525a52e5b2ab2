//! Domain and database models for court quotations.
//!
//! Row types use sqlx's FromRow derive for direct database deserialization and
//! are converted into the domain types with `TryFrom`, so that a malformed row
//! surfaces as an error instead of a silently coerced value.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Failed to parse a closed enum from its wire/storage form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Supported sports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Basketball,
    Tennis,
    Badminton,
    Volleyball,
    Pickleball,
}

impl Sport {
    pub const ALL: [Sport; 5] = [
        Sport::Basketball,
        Sport::Tennis,
        Sport::Badminton,
        Sport::Volleyball,
        Sport::Pickleball,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Basketball => "basketball",
            Sport::Tennis => "tennis",
            Sport::Badminton => "badminton",
            Sport::Volleyball => "volleyball",
            Sport::Pickleball => "pickleball",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sport::Basketball => "Basketball",
            Sport::Tennis => "Tennis",
            Sport::Badminton => "Badminton",
            Sport::Volleyball => "Volleyball",
            Sport::Pickleball => "Pickleball",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sport::ALL
            .into_iter()
            .find(|sport| sport.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "sport",
                value: s.to_string(),
            })
    }
}

/// Court size tier. Determines how area is resolved and which rate entry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    Standard,
    Custom,
    Premium,
}

impl SizeTier {
    pub const ALL: [SizeTier; 3] = [SizeTier::Standard, SizeTier::Custom, SizeTier::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Standard => "standard",
            SizeTier::Custom => "custom",
            SizeTier::Premium => "premium",
        }
    }

    /// Custom and premium courts are priced from user-supplied dimensions
    pub fn uses_custom_dimensions(&self) -> bool {
        !matches!(self, SizeTier::Standard)
    }
}

impl fmt::Display for SizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeTier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeTier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "size tier",
                value: s.to_string(),
            })
    }
}

/// How an add-on price scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Charged once regardless of court size
    Flat,
    /// Charged per square metre of resolved area
    PerArea,
}

/// Price of one optional add-on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnPrice {
    pub label: String,
    pub amount: Decimal,
    pub basis: PriceBasis,
}

impl AddOnPrice {
    pub fn flat(label: &str, amount: Decimal) -> Self {
        Self {
            label: label.to_string(),
            amount,
            basis: PriceBasis::Flat,
        }
    }

    pub fn per_area(label: &str, amount: Decimal) -> Self {
        Self {
            label: label.to_string(),
            amount,
            basis: PriceBasis::PerArea,
        }
    }
}

/// Active rate for one (sport, size tier) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub sport: Sport,
    pub size_tier: SizeTier,
    /// Currency per square metre
    pub base_area_rate: Decimal,
    pub tier_multiplier: Decimal,
    pub add_on_prices: BTreeMap<String, AddOnPrice>,
    pub currency: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl RateEntry {
    /// Check the catalog integrity rules for this entry.
    ///
    /// Returns every violation found rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.base_area_rate < Decimal::ZERO {
            errors.push(format!("base_area_rate {} is negative", self.base_area_rate));
        }
        if self.tier_multiplier < Decimal::ONE {
            errors.push(format!(
                "tier_multiplier {} is below 1.0",
                self.tier_multiplier
            ));
        }
        if self.currency.trim().is_empty() {
            errors.push("currency is empty".to_string());
        }
        for (code, price) in &self.add_on_prices {
            if price.amount < Decimal::ZERO {
                errors.push(format!("add-on '{}' has negative amount {}", code, price.amount));
            }
            // Flat prices become subtotals as-is; more than 2 places would break the total.
            if price.basis == PriceBasis::Flat && price.amount.normalize().scale() > 2 {
                errors.push(format!(
                    "flat add-on '{}' amount {} has more than 2 decimal places",
                    code, price.amount
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// rate_entries row
#[derive(Debug, Clone, FromRow)]
pub struct RateRow {
    pub sport: String,
    pub size_tier: String,
    pub base_area_rate: Decimal,
    pub tier_multiplier: Decimal,
    pub add_on_prices: serde_json::Value,
    pub currency: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RateRow> for RateEntry {
    type Error = AppError;

    fn try_from(row: RateRow) -> Result<Self, Self::Error> {
        Ok(RateEntry {
            sport: row
                .sport
                .parse()
                .map_err(|e: ParseEnumError| AppError::CorruptRecord(e.to_string()))?,
            size_tier: row
                .size_tier
                .parse()
                .map_err(|e: ParseEnumError| AppError::CorruptRecord(e.to_string()))?,
            base_area_rate: row.base_area_rate,
            tier_multiplier: row.tier_multiplier,
            add_on_prices: serde_json::from_value(row.add_on_prices)?,
            currency: row.currency,
            version: row.version,
            updated_at: row.updated_at,
        })
    }
}

/// court_standard_areas row
#[derive(Debug, Clone, FromRow)]
pub struct StandardAreaRow {
    pub sport: String,
    pub standard_area: Decimal,
}

/// Length and width in metres as supplied by the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomDimensions {
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    /// Client-computed area. Kept as submitted, never used for pricing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Decimal>,
}

/// A court request as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtSpecification {
    pub sport: Sport,
    pub size_tier: SizeTier,
    #[serde(default)]
    pub custom_dimensions: Option<CustomDimensions>,
    #[serde(default)]
    pub add_ons: Vec<String>,
}

/// One priced component of a quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationLineItem {
    /// `base` for the court itself, otherwise the add-on identifier
    pub code: String,
    pub label: String,
    pub unit_rate: Decimal,
    pub quantity: Decimal,
    pub subtotal: Decimal,
}

/// Catalog values copied into a quotation at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base_area_rate: Decimal,
    pub tier_multiplier: Decimal,
}

/// An issued quotation. Price-bearing fields never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationRecord {
    pub id: Uuid,
    pub court_specification: CourtSpecification,
    pub size_tier: SizeTier,
    pub resolved_area: Decimal,
    pub line_items: Vec<QuotationLineItem>,
    pub total: Decimal,
    pub currency: String,
    pub rate_snapshot: RateSnapshot,
    pub rates_snapshot_version: i64,
    pub created_at: DateTime<Utc>,
}

/// quotations row
#[derive(Debug, Clone, FromRow)]
pub struct QuotationRow {
    pub id: Uuid,
    pub sport: String,
    pub size_tier: String,
    pub court_specification: serde_json::Value,
    pub resolved_area: Decimal,
    pub line_items: serde_json::Value,
    pub total: Decimal,
    pub currency: String,
    pub base_area_rate: Decimal,
    pub tier_multiplier: Decimal,
    pub rates_snapshot_version: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<QuotationRow> for QuotationRecord {
    type Error = AppError;

    fn try_from(row: QuotationRow) -> Result<Self, Self::Error> {
        let court_specification: CourtSpecification =
            serde_json::from_value(row.court_specification)?;
        if court_specification.sport.as_str() != row.sport {
            return Err(AppError::CorruptRecord(format!(
                "quotation {} sport column '{}' disagrees with stored specification",
                row.id, row.sport
            )));
        }

        Ok(QuotationRecord {
            id: row.id,
            court_specification,
            size_tier: row
                .size_tier
                .parse()
                .map_err(|e: ParseEnumError| AppError::CorruptRecord(e.to_string()))?,
            resolved_area: row.resolved_area,
            line_items: serde_json::from_value(row.line_items)?,
            total: row.total,
            currency: row.currency,
            rate_snapshot: RateSnapshot {
                base_area_rate: row.base_area_rate,
                tier_multiplier: row.tier_multiplier,
            },
            rates_snapshot_version: row.rates_snapshot_version,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry() -> RateEntry {
        let mut add_on_prices = BTreeMap::new();
        add_on_prices.insert("lighting".to_string(), AddOnPrice::flat("Lighting", dec!(500)));
        add_on_prices.insert(
            "shock_pad".to_string(),
            AddOnPrice::per_area("Shock pad", dec!(4.125)),
        );
        RateEntry {
            sport: Sport::Basketball,
            size_tier: SizeTier::Custom,
            base_area_rate: dec!(10),
            tier_multiplier: dec!(1.0),
            add_on_prices,
            currency: "USD".to_string(),
            version: 1,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sport_parse_round_trip() {
        for sport in Sport::ALL {
            assert_eq!(sport.as_str().parse::<Sport>().unwrap(), sport);
        }
        let err = "curling".parse::<Sport>().unwrap_err();
        assert_eq!(err.to_string(), "unknown sport 'curling'");
    }

    #[test]
    fn test_size_tier_parse() {
        assert_eq!("premium".parse::<SizeTier>().unwrap(), SizeTier::Premium);
        assert!("Premium".parse::<SizeTier>().is_err());
        assert!(!SizeTier::Standard.uses_custom_dimensions());
        assert!(SizeTier::Custom.uses_custom_dimensions());
    }

    #[test]
    fn test_sport_serde_lowercase() {
        let json = serde_json::to_string(&Sport::Pickleball).unwrap();
        assert_eq!(json, "\"pickleball\"");
        assert!(serde_json::from_str::<Sport>("\"hockey\"").is_err());
    }

    #[test]
    fn test_rate_entry_valid() {
        // Per-area prices may carry extra precision; they are rounded per line.
        assert!(entry().validate().is_ok());
    }

    #[test]
    fn test_rate_entry_rejects_negative_rates() {
        let mut e = entry();
        e.base_area_rate = dec!(-1);
        e.add_on_prices
            .insert("seating".to_string(), AddOnPrice::flat("Seating", dec!(-5)));
        let errors = e.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_rate_entry_rejects_low_multiplier() {
        let mut e = entry();
        e.tier_multiplier = dec!(0.95);
        let errors = e.validate().unwrap_err();
        assert!(errors[0].contains("tier_multiplier"));
    }

    #[test]
    fn test_rate_entry_rejects_precise_flat_price() {
        let mut e = entry();
        e.add_on_prices
            .insert("lighting".to_string(), AddOnPrice::flat("Lighting", dec!(500.005)));
        assert!(e.validate().is_err());

        // Trailing zeros do not count as precision
        e.add_on_prices
            .insert("lighting".to_string(), AddOnPrice::flat("Lighting", dec!(500.5000)));
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_rate_row_rejects_unknown_sport() {
        let row = RateRow {
            sport: "quidditch".to_string(),
            size_tier: "standard".to_string(),
            base_area_rate: dec!(10),
            tier_multiplier: dec!(1),
            add_on_prices: serde_json::json!({}),
            currency: "USD".to_string(),
            version: 1,
            updated_at: Utc::now(),
        };
        let err = RateEntry::try_from(row).unwrap_err();
        assert!(matches!(err, AppError::CorruptRecord(_)));
    }

    #[test]
    fn test_rate_row_parses_add_ons() {
        let row = RateRow {
            sport: "tennis".to_string(),
            size_tier: "premium".to_string(),
            base_area_rate: dec!(12),
            tier_multiplier: dec!(1.3),
            add_on_prices: serde_json::json!({
                "lighting": {"label": "Lighting", "amount": "750.00", "basis": "flat"},
                "drainage": {"label": "Drainage", "amount": "3.5", "basis": "per_area"}
            }),
            currency: "USD".to_string(),
            version: 4,
            updated_at: Utc::now(),
        };
        let entry = RateEntry::try_from(row).unwrap();
        assert_eq!(entry.size_tier, SizeTier::Premium);
        assert_eq!(entry.add_on_prices["drainage"].basis, PriceBasis::PerArea);
        assert_eq!(entry.add_on_prices["lighting"].amount, dec!(750));
    }
}
