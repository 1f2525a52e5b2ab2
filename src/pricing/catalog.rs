//! Rate catalog: the live source of per-sport, per-tier rates.
//!
//! The catalog is an explicit service handed to the quotation engine. Storage
//! backends enforce one entry per (sport, size tier); bootstrap inserts use
//! create-if-absent so that racing processes all end up with a single entry.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{AppError, Result};

use super::models::{AddOnPrice, RateEntry, SizeTier, Sport};

/// Currency used for the bootstrap rate table
pub const DEFAULT_CURRENCY: &str = "USD";

/// Read and bootstrap operations over the rate catalog
#[async_trait]
pub trait RateCatalog: Send + Sync {
    /// Active entry for the pair, if any
    async fn get_rate(&self, sport: Sport, size_tier: SizeTier) -> Result<Option<RateEntry>>;

    /// Canonical standard court area for the sport, in square metres
    async fn standard_area(&self, sport: Sport) -> Result<Option<Decimal>>;

    /// Create the entry unless one already exists for its key.
    ///
    /// Returns `false` when an entry was already present. That outcome is a
    /// success, including when another process inserted it concurrently.
    async fn insert_rate_if_absent(&self, entry: &RateEntry) -> Result<bool>;

    /// Same contract as [`RateCatalog::insert_rate_if_absent`] for standard areas
    async fn insert_standard_area_if_absent(&self, sport: Sport, area: Decimal) -> Result<bool>;

    /// Replace the rate fields of an existing entry and bump its version.
    ///
    /// Fails with [`AppError::NotFound`] if there is no entry for the key.
    async fn update_rate(&self, entry: &RateEntry) -> Result<RateEntry>;

    async fn list_rates(&self) -> Result<Vec<RateEntry>>;

    async fn list_standard_areas(&self) -> Result<Vec<(Sport, Decimal)>>;
}

/// Catalog held in process memory. Used by tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryRateCatalog {
    rates: RwLock<HashMap<(Sport, SizeTier), RateEntry>>,
    standard_areas: RwLock<HashMap<Sport, Decimal>>,
}

impl InMemoryRateCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateCatalog for InMemoryRateCatalog {
    async fn get_rate(&self, sport: Sport, size_tier: SizeTier) -> Result<Option<RateEntry>> {
        Ok(self.rates.read().await.get(&(sport, size_tier)).cloned())
    }

    async fn standard_area(&self, sport: Sport) -> Result<Option<Decimal>> {
        Ok(self.standard_areas.read().await.get(&sport).copied())
    }

    async fn insert_rate_if_absent(&self, entry: &RateEntry) -> Result<bool> {
        // Check and insert happen under one write lock
        let mut rates = self.rates.write().await;
        let key = (entry.sport, entry.size_tier);
        if rates.contains_key(&key) {
            return Ok(false);
        }
        rates.insert(key, entry.clone());
        Ok(true)
    }

    async fn insert_standard_area_if_absent(&self, sport: Sport, area: Decimal) -> Result<bool> {
        let mut areas = self.standard_areas.write().await;
        if areas.contains_key(&sport) {
            return Ok(false);
        }
        areas.insert(sport, area);
        Ok(true)
    }

    async fn update_rate(&self, entry: &RateEntry) -> Result<RateEntry> {
        let mut rates = self.rates.write().await;
        let current = rates
            .get_mut(&(entry.sport, entry.size_tier))
            .ok_or(AppError::NotFound)?;

        *current = RateEntry {
            version: current.version + 1,
            updated_at: Utc::now(),
            ..entry.clone()
        };
        Ok(current.clone())
    }

    async fn list_rates(&self) -> Result<Vec<RateEntry>> {
        let mut rates: Vec<RateEntry> = self.rates.read().await.values().cloned().collect();
        rates.sort_by_key(|r| (r.sport, r.size_tier));
        Ok(rates)
    }

    async fn list_standard_areas(&self) -> Result<Vec<(Sport, Decimal)>> {
        let mut areas: Vec<(Sport, Decimal)> = self
            .standard_areas
            .read()
            .await
            .iter()
            .map(|(sport, area)| (*sport, *area))
            .collect();
        areas.sort_by_key(|(sport, _)| *sport);
        Ok(areas)
    }
}

/// Canonical standard court areas in square metres
pub fn default_standard_areas() -> Vec<(Sport, Decimal)> {
    vec![
        (Sport::Basketball, dec!(420.00)), // 28 x 15
        (Sport::Tennis, dec!(260.76)),     // 23.77 x 10.97 (doubles)
        (Sport::Badminton, dec!(81.74)),   // 13.4 x 6.1 (doubles)
        (Sport::Volleyball, dec!(162.00)), // 18 x 9
        (Sport::Pickleball, dec!(81.74)),  // 13.4 x 6.1
    ]
}

fn default_base_area_rate(sport: Sport) -> Decimal {
    match sport {
        Sport::Basketball => dec!(45.00),
        Sport::Tennis => dec!(40.00),
        Sport::Badminton => dec!(55.00),
        Sport::Volleyball => dec!(38.00),
        Sport::Pickleball => dec!(50.00),
    }
}

fn default_tier_multiplier(size_tier: SizeTier) -> Decimal {
    match size_tier {
        SizeTier::Standard => dec!(1.00),
        SizeTier::Custom => dec!(1.10),
        SizeTier::Premium => dec!(1.35),
    }
}

fn default_add_on_prices(sport: Sport) -> BTreeMap<String, AddOnPrice> {
    let mut prices = BTreeMap::new();
    prices.insert("lighting".to_string(), AddOnPrice::flat("LED floodlighting", dec!(4500.00)));
    prices.insert("fencing".to_string(), AddOnPrice::flat("Perimeter fencing", dec!(2800.00)));
    prices.insert("seating".to_string(), AddOnPrice::flat("Spectator seating", dec!(1800.00)));
    prices.insert(
        "drainage".to_string(),
        AddOnPrice::per_area("Sub-surface drainage", dec!(6.50)),
    );
    prices.insert(
        "shock_pad".to_string(),
        AddOnPrice::per_area("Cushioned shock pad", dec!(12.00)),
    );
    prices.insert(
        "acrylic_coating".to_string(),
        AddOnPrice::per_area("Acrylic surface coating", dec!(8.75)),
    );
    match sport {
        Sport::Basketball => {
            prices.insert(
                "hoop_system".to_string(),
                AddOnPrice::flat("Hoop system (pair)", dec!(3200.00)),
            );
        }
        Sport::Tennis | Sport::Badminton | Sport::Volleyball | Sport::Pickleball => {
            prices.insert(
                "net_system".to_string(),
                AddOnPrice::flat("Posts and net", dec!(650.00)),
            );
        }
    }
    prices
}

/// Documented default rate table: one entry per supported (sport, tier) pair
pub fn default_rates(now: DateTime<Utc>) -> Vec<RateEntry> {
    Sport::ALL
        .into_iter()
        .flat_map(|sport| {
            SizeTier::ALL.into_iter().map(move |size_tier| RateEntry {
                sport,
                size_tier,
                base_area_rate: default_base_area_rate(sport),
                tier_multiplier: default_tier_multiplier(size_tier),
                add_on_prices: default_add_on_prices(sport),
                currency: DEFAULT_CURRENCY.to_string(),
                version: 1,
                updated_at: now,
            })
        })
        .collect()
}

/// Outcome of [`ensure_defaults`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created: usize,
    pub existing: usize,
}

/// Create any missing default catalog entries.
///
/// Idempotent and safe to run from several processes at once: entries that
/// already exist, or that a concurrent caller created first, count as existing.
pub async fn ensure_defaults(catalog: &dyn RateCatalog) -> Result<BootstrapReport> {
    let mut report = BootstrapReport::default();

    for (sport, area) in default_standard_areas() {
        if catalog.insert_standard_area_if_absent(sport, area).await? {
            report.created += 1;
        } else {
            report.existing += 1;
        }
    }

    for entry in default_rates(Utc::now()) {
        if catalog.insert_rate_if_absent(&entry).await? {
            info!(
                sport = %entry.sport,
                size_tier = %entry.size_tier,
                "Initialized default rate entry"
            );
            report.created += 1;
        } else {
            report.existing += 1;
        }
    }

    if report.created == 0 {
        info!(existing = report.existing, "Pricing data already exists in catalog");
    } else {
        info!(
            created = report.created,
            existing = report.existing,
            "Default pricing data initialized"
        );
    }

    Ok(report)
}
