//! In-memory caching using moka
//!
//! Rate entries are read on every quotation but change rarely, so the catalog
//! is wrapped in a read-through cache. Whole entries are cached behind `Arc`;
//! a reader gets every field of one entry version or none of it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::Op;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::Result;
use crate::pricing::catalog::RateCatalog;
use crate::pricing::models::{RateEntry, SizeTier, Sport};

/// Read-through cache in front of another rate catalog
#[derive(Clone)]
pub struct CachedRateCatalog {
    inner: Arc<dyn RateCatalog>,
    /// (sport, tier) -> active rate entry
    rates: Cache<(Sport, SizeTier), Arc<RateEntry>>,
    /// sport -> standard court area
    standard_areas: Cache<Sport, Decimal>,
}

impl CachedRateCatalog {
    /// Wrap `inner` with the given TTL and per-cache capacity
    pub fn new(inner: Arc<dyn RateCatalog>, ttl: Duration, capacity: u64) -> Self {
        Self {
            inner,
            rates: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            standard_areas: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cache `entry` unless a newer version of the same key is already cached.
    ///
    /// A lookup that started before an update may finish after it; the version
    /// check keeps that late read from replacing the updated entry.
    async fn remember_rate(&self, entry: &RateEntry) {
        let fresh = Arc::new(entry.clone());
        self.rates
            .entry((entry.sport, entry.size_tier))
            .and_compute_with(move |cached| {
                let op = match cached {
                    Some(cached) if cached.value().version >= fresh.version => Op::Nop,
                    _ => Op::Put(fresh),
                };
                std::future::ready(op)
            })
            .await;
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.rates.invalidate_all();
        self.standard_areas.invalidate_all();
        info!("Rate catalog cache invalidated");
    }
}

#[async_trait]
impl RateCatalog for CachedRateCatalog {
    async fn get_rate(&self, sport: Sport, size_tier: SizeTier) -> Result<Option<RateEntry>> {
        let key = (sport, size_tier);
        if let Some(cached) = self.rates.get(&key).await {
            debug!(%sport, %size_tier, "Cache HIT for rate entry");
            return Ok(Some((*cached).clone()));
        }

        debug!(%sport, %size_tier, "Cache MISS for rate entry");
        // Misses are not cached so a bootstrap that lands later is seen at once
        let entry = self.inner.get_rate(sport, size_tier).await?;
        if let Some(entry) = &entry {
            self.remember_rate(entry).await;
        }
        Ok(entry)
    }

    async fn standard_area(&self, sport: Sport) -> Result<Option<Decimal>> {
        if let Some(area) = self.standard_areas.get(&sport).await {
            return Ok(Some(area));
        }

        let area = self.inner.standard_area(sport).await?;
        if let Some(area) = area {
            self.standard_areas.insert(sport, area).await;
        }
        Ok(area)
    }

    async fn insert_rate_if_absent(&self, entry: &RateEntry) -> Result<bool> {
        self.inner.insert_rate_if_absent(entry).await
    }

    async fn insert_standard_area_if_absent(&self, sport: Sport, area: Decimal) -> Result<bool> {
        self.inner.insert_standard_area_if_absent(sport, area).await
    }

    async fn update_rate(&self, entry: &RateEntry) -> Result<RateEntry> {
        let updated = self.inner.update_rate(entry).await?;
        self.remember_rate(&updated).await;
        info!(
            sport = %updated.sport,
            size_tier = %updated.size_tier,
            version = updated.version,
            "Rate entry updated"
        );
        Ok(updated)
    }

    async fn list_rates(&self) -> Result<Vec<RateEntry>> {
        self.inner.list_rates().await
    }

    async fn list_standard_areas(&self) -> Result<Vec<(Sport, Decimal)>> {
        self.inner.list_standard_areas().await
    }
}
