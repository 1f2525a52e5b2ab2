//! Core pricing calculation functions.
//!
//! Pure functions for quotation math - no database access. Every subtotal is
//! rounded on its own before summation so that displayed line items always add
//! up to the displayed total.

use std::collections::HashSet;

use rust_decimal::prelude::*;

use super::models::{AddOnPrice, PriceBasis, QuotationLineItem, RateEntry, Sport, SizeTier};
use super::services::PricingError;

/// Decimal places used for money and area values
pub const MONEY_PLACES: u32 = 2;

/// Line item code of the court construction cost
pub const BASE_LINE_CODE: &str = "base";

/// Round to specified decimal places using round-half-up (ROUND_HALF_UP).
///
/// Midpoints round away from zero. The result always carries exactly `places`
/// decimal places so that `420` is presented as `420.00`.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use court_quote::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(1.005), 2), dec!(1.01));
/// assert_eq!(round_money(dec!(420), 2).to_string(), "420.00");
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded
}

/// Itemized prices before persistence
#[derive(Debug, Clone, PartialEq)]
pub struct PricedQuotation {
    pub line_items: Vec<QuotationLineItem>,
    pub total: Decimal,
}

/// Price the court itself: `round2(area * base_area_rate * tier_multiplier)`.
pub fn base_line_item(
    sport: Sport,
    size_tier: SizeTier,
    area: Decimal,
    rate: &RateEntry,
) -> Result<QuotationLineItem, PricingError> {
    let unit_rate = rate
        .base_area_rate
        .checked_mul(rate.tier_multiplier)
        .ok_or_else(too_large)?;
    let subtotal = area.checked_mul(unit_rate).ok_or_else(too_large)?;

    Ok(QuotationLineItem {
        code: BASE_LINE_CODE.to_string(),
        label: format!("{} court construction ({} size)", sport.display_name(), size_tier),
        unit_rate,
        quantity: area,
        subtotal: round_money(subtotal, MONEY_PLACES),
    })
}

/// Price one add-on. Flat prices are taken unmodified; per-area prices scale
/// with the resolved area.
pub fn add_on_line_item(
    code: &str,
    price: &AddOnPrice,
    area: Decimal,
) -> Result<QuotationLineItem, PricingError> {
    let (quantity, subtotal) = match price.basis {
        PriceBasis::Flat => (Decimal::ONE, price.amount),
        PriceBasis::PerArea => {
            let subtotal = area.checked_mul(price.amount).ok_or_else(too_large)?;
            (area, round_money(subtotal, MONEY_PLACES))
        }
    };

    Ok(QuotationLineItem {
        code: code.to_string(),
        label: price.label.clone(),
        unit_rate: price.amount,
        quantity,
        subtotal,
    })
}

/// Sum already-rounded subtotals and round the result.
pub fn calculate_total(line_items: &[QuotationLineItem]) -> Result<Decimal, PricingError> {
    let sum = line_items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.subtotal))
        .ok_or_else(too_large)?;
    Ok(round_money(sum, MONEY_PLACES))
}

fn too_large() -> PricingError {
    PricingError::validation("customDimensions", "area is too large to price")
}

/// Build every line item for a quotation.
///
/// The base cost comes first, then add-ons in the order they were selected.
/// Any unknown or repeated add-on fails the whole quotation before anything
/// is persisted.
pub fn price_quotation(
    sport: Sport,
    size_tier: SizeTier,
    area: Decimal,
    rate: &RateEntry,
    add_ons: &[String],
) -> Result<PricedQuotation, PricingError> {
    let mut line_items = Vec::with_capacity(add_ons.len() + 1);
    line_items.push(base_line_item(sport, size_tier, area, rate)?);

    let mut seen = HashSet::with_capacity(add_ons.len());
    for (index, code) in add_ons.iter().enumerate() {
        let field = format!("addOns[{}]", index);
        if !seen.insert(code.as_str()) {
            return Err(PricingError::validation(
                field,
                format!("add-on '{}' is selected more than once", code),
            ));
        }
        let price = rate.add_on_prices.get(code).ok_or_else(|| {
            PricingError::validation(
                field,
                format!("unknown add-on '{}' for {} {} courts", code, size_tier, sport),
            )
        })?;
        line_items.push(add_on_line_item(code, price, area)?);
    }

    let total = calculate_total(&line_items)?;

    Ok(PricedQuotation { line_items, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn rate(base: Decimal, multiplier: Decimal) -> RateEntry {
        let mut add_on_prices = BTreeMap::new();
        add_on_prices.insert(
            "lighting".to_string(),
            AddOnPrice::flat("LED floodlighting", dec!(500)),
        );
        add_on_prices.insert(
            "shock_pad".to_string(),
            AddOnPrice::per_area("Cushioned shock pad", dec!(3.335)),
        );
        add_on_prices.insert(
            "fencing".to_string(),
            AddOnPrice::flat("Perimeter fencing", dec!(1250.50)),
        );
        RateEntry {
            sport: Sport::Basketball,
            size_tier: SizeTier::Custom,
            base_area_rate: base,
            tier_multiplier: multiplier,
            add_on_prices,
            currency: "USD".to_string(),
            version: 3,
            updated_at: Utc::now(),
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(3));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_money(dec!(2.355), 2), dec!(2.36));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(1.2349), 2), dec!(1.23));
    }

    #[test]
    fn test_round_money_pads_scale() {
        assert_eq!(round_money(dec!(420), 2).to_string(), "420.00");
        assert_eq!(round_money(dec!(0), 2).to_string(), "0.00");
        assert_eq!(round_money(dec!(25.1), 1).to_string(), "25.1");
    }

    #[test]
    fn test_round_money_large_values() {
        assert_eq!(round_money(dec!(123456.785), 2), dec!(123456.79));
        assert_eq!(round_money(dec!(999999.995), 2), dec!(1000000.00));
    }

    // ==================== line item tests ====================

    #[test]
    fn test_base_line_item_applies_multiplier() {
        let item = base_line_item(
            Sport::Basketball,
            SizeTier::Premium,
            dec!(100.00),
            &rate(dec!(10), dec!(1.35)),
        )
        .unwrap();
        assert_eq!(item.code, BASE_LINE_CODE);
        assert_eq!(item.unit_rate, dec!(13.5));
        assert_eq!(item.quantity, dec!(100.00));
        assert_eq!(item.subtotal, dec!(1350.00));
        assert_eq!(item.label, "Basketball court construction (premium size)");
    }

    #[test]
    fn test_flat_add_on_unmodified() {
        let price = AddOnPrice::flat("Perimeter fencing", dec!(1250.50));
        let item = add_on_line_item("fencing", &price, dec!(999.99)).unwrap();
        assert_eq!(item.quantity, dec!(1));
        assert_eq!(item.subtotal, dec!(1250.50));
    }

    #[test]
    fn test_per_area_add_on_rounds_per_line() {
        let price = AddOnPrice::per_area("Cushioned shock pad", dec!(3.335));
        let item = add_on_line_item("shock_pad", &price, dec!(81.74)).unwrap();
        // 81.74 * 3.335 = 272.6029
        assert_eq!(item.subtotal, dec!(272.60));
        assert_eq!(item.quantity, dec!(81.74));
    }

    // ==================== price_quotation tests ====================

    #[test]
    fn test_custom_basketball_with_lighting() {
        let priced = price_quotation(
            Sport::Basketball,
            SizeTier::Custom,
            dec!(420.00),
            &rate(dec!(10), dec!(1.0)),
            &["lighting".to_string()],
        )
        .unwrap();

        assert_eq!(priced.line_items.len(), 2);
        assert_eq!(priced.line_items[0].subtotal, dec!(4200.00));
        assert_eq!(priced.line_items[1].code, "lighting");
        assert_eq!(priced.line_items[1].subtotal, dec!(500));
        assert_eq!(priced.total, dec!(4700.00));
        assert_eq!(priced.total.to_string(), "4700.00");
    }

    #[test]
    fn test_standard_tennis_no_add_ons() {
        let mut entry = rate(dec!(12), dec!(1.0));
        entry.sport = Sport::Tennis;
        entry.size_tier = SizeTier::Standard;
        let priced =
            price_quotation(Sport::Tennis, SizeTier::Standard, dec!(260.76), &entry, &[]).unwrap();

        assert_eq!(priced.line_items.len(), 1);
        assert_eq!(priced.total, dec!(3129.12));
    }

    #[test]
    fn test_add_ons_keep_selection_order() {
        let add_ons = vec![
            "shock_pad".to_string(),
            "lighting".to_string(),
            "fencing".to_string(),
        ];
        let priced = price_quotation(
            Sport::Basketball,
            SizeTier::Custom,
            dec!(50.00),
            &rate(dec!(10), dec!(1.0)),
            &add_ons,
        )
        .unwrap();

        let codes: Vec<&str> = priced.line_items.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["base", "shock_pad", "lighting", "fencing"]);
    }

    #[test]
    fn test_unknown_add_on_rejected() {
        let err = price_quotation(
            Sport::Basketball,
            SizeTier::Custom,
            dec!(420.00),
            &rate(dec!(10), dec!(1.0)),
            &["lighting".to_string(), "jacuzzi".to_string()],
        )
        .unwrap_err();

        match err {
            PricingError::Validation { field, reason } => {
                assert_eq!(field, "addOns[1]");
                assert!(reason.contains("jacuzzi"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_add_on_rejected() {
        let err = price_quotation(
            Sport::Basketball,
            SizeTier::Custom,
            dec!(420.00),
            &rate(dec!(10), dec!(1.0)),
            &["lighting".to_string(), "lighting".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::Validation { ref field, .. } if field == "addOns[1]"));
    }

    #[test]
    fn test_total_equals_sum_of_subtotals() {
        // Awkward areas and rates that produce half-cent midpoints per line
        let areas = [
            dec!(0.01),
            dec!(13.37),
            dec!(81.74),
            dec!(260.76),
            dec!(333.33),
            dec!(1234.57),
        ];
        let bases = [dec!(0.333), dec!(9.995), dec!(12.125), dec!(47.77)];
        let multipliers = [dec!(1), dec!(1.15), dec!(1.333)];
        let add_ons = vec![
            "lighting".to_string(),
            "shock_pad".to_string(),
            "fencing".to_string(),
        ];

        for area in areas {
            for base in bases {
                for multiplier in multipliers {
                    let priced = price_quotation(
                        Sport::Basketball,
                        SizeTier::Custom,
                        area,
                        &rate(base, multiplier),
                        &add_ons,
                    )
                    .unwrap();
                    let sum: Decimal = priced.line_items.iter().map(|i| i.subtotal).sum();
                    assert_eq!(sum, priced.total, "area={area} base={base} mult={multiplier}");
                    assert!(priced.line_items.iter().all(|i| i.subtotal.scale() <= 2));
                }
            }
        }
    }

    #[test]
    fn test_oversized_area_is_validation_error() {
        // Fits in a Decimal, but area * rate does not
        let area = Decimal::MAX;
        let err = price_quotation(
            Sport::Basketball,
            SizeTier::Custom,
            area,
            &rate(dec!(45), dec!(1.10)),
            &[],
        )
        .unwrap_err();
        assert!(
            matches!(err, PricingError::Validation { ref field, .. } if field == "customDimensions")
        );

        let price = AddOnPrice::per_area("Cushioned shock pad", dec!(12));
        assert!(add_on_line_item("shock_pad", &price, area).is_err());
    }

    #[test]
    fn test_total_overflow_is_validation_error() {
        let item = QuotationLineItem {
            code: "base".to_string(),
            label: "Base".to_string(),
            unit_rate: Decimal::ONE,
            quantity: Decimal::ONE,
            subtotal: Decimal::MAX,
        };
        let err = calculate_total(&[item.clone(), item]).unwrap_err();
        assert!(matches!(err, PricingError::Validation { .. }));
    }
}
