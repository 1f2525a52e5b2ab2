//! Database queries for the rate catalog and quotation store.
//!
//! Uniqueness of catalog entries is enforced by primary keys; bootstrap inserts
//! use `ON CONFLICT DO NOTHING` so a lost race is reported as "already present".

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::catalog::RateCatalog;
use super::models::{
    ParseEnumError, QuotationRecord, QuotationRow, RateEntry, RateRow, SizeTier, Sport,
    StandardAreaRow,
};
use super::store::QuotationStore;

const RATE_COLUMNS: &str = "sport, size_tier, base_area_rate, tier_multiplier, \
                            add_on_prices, currency, version, updated_at";

/// Rate catalog backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgRateCatalog {
    pool: PgPool,
}

impl PgRateCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateCatalog for PgRateCatalog {
    async fn get_rate(&self, sport: Sport, size_tier: SizeTier) -> Result<Option<RateEntry>> {
        // Single-row read: every rate field comes from the same row version
        let row = sqlx::query_as::<_, RateRow>(&format!(
            "SELECT {RATE_COLUMNS} FROM rate_entries WHERE sport = $1 AND size_tier = $2"
        ))
        .bind(sport.as_str())
        .bind(size_tier.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(RateEntry::try_from).transpose()
    }

    async fn standard_area(&self, sport: Sport) -> Result<Option<Decimal>> {
        let area = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT standard_area
            FROM court_standard_areas
            WHERE sport = $1
            "#,
        )
        .bind(sport.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(area)
    }

    async fn insert_rate_if_absent(&self, entry: &RateEntry) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO rate_entries (
                sport, size_tier, base_area_rate, tier_multiplier,
                add_on_prices, currency, version, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (sport, size_tier) DO NOTHING
            "#,
        )
        .bind(entry.sport.as_str())
        .bind(entry.size_tier.as_str())
        .bind(entry.base_area_rate)
        .bind(entry.tier_multiplier)
        .bind(serde_json::to_value(&entry.add_on_prices)?)
        .bind(&entry.currency)
        .bind(entry.version)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_standard_area_if_absent(&self, sport: Sport, area: Decimal) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO court_standard_areas (sport, standard_area)
            VALUES ($1, $2)
            ON CONFLICT (sport) DO NOTHING
            "#,
        )
        .bind(sport.as_str())
        .bind(area)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_rate(&self, entry: &RateEntry) -> Result<RateEntry> {
        let row = sqlx::query_as::<_, RateRow>(&format!(
            r#"
            UPDATE rate_entries
            SET base_area_rate = $3,
                tier_multiplier = $4,
                add_on_prices = $5,
                currency = $6,
                version = version + 1,
                updated_at = NOW()
            WHERE sport = $1 AND size_tier = $2
            RETURNING {RATE_COLUMNS}
            "#
        ))
        .bind(entry.sport.as_str())
        .bind(entry.size_tier.as_str())
        .bind(entry.base_area_rate)
        .bind(entry.tier_multiplier)
        .bind(serde_json::to_value(&entry.add_on_prices)?)
        .bind(&entry.currency)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;

        RateEntry::try_from(row)
    }

    async fn list_rates(&self) -> Result<Vec<RateEntry>> {
        let rows = sqlx::query_as::<_, RateRow>(&format!(
            "SELECT {RATE_COLUMNS} FROM rate_entries"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut rates = rows
            .into_iter()
            .map(RateEntry::try_from)
            .collect::<Result<Vec<_>>>()?;
        rates.sort_by_key(|r| (r.sport, r.size_tier));
        Ok(rates)
    }

    async fn list_standard_areas(&self) -> Result<Vec<(Sport, Decimal)>> {
        let rows = sqlx::query_as::<_, StandardAreaRow>(
            r#"
            SELECT sport, standard_area
            FROM court_standard_areas
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut areas = rows
            .into_iter()
            .map(|row| {
                row.sport
                    .parse::<Sport>()
                    .map(|sport| (sport, row.standard_area))
                    .map_err(|e: ParseEnumError| AppError::CorruptRecord(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        areas.sort_by_key(|(sport, _)| *sport);
        Ok(areas)
    }
}

/// Quotation store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgQuotationStore {
    pool: PgPool,
}

impl PgQuotationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotationStore for PgQuotationStore {
    async fn insert(&self, record: &QuotationRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quotations (
                id, sport, size_tier, court_specification, resolved_area,
                line_items, total, currency, base_area_rate, tier_multiplier,
                rates_snapshot_version, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(record.court_specification.sport.as_str())
        .bind(record.size_tier.as_str())
        .bind(serde_json::to_value(&record.court_specification)?)
        .bind(record.resolved_area)
        .bind(serde_json::to_value(&record.line_items)?)
        .bind(record.total)
        .bind(&record.currency)
        .bind(record.rate_snapshot.base_area_rate)
        .bind(record.rate_snapshot.tier_multiplier)
        .bind(record.rates_snapshot_version)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<QuotationRecord>> {
        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            SELECT
                id, sport, size_tier, court_specification, resolved_area,
                line_items, total, currency, base_area_rate, tier_multiplier,
                rates_snapshot_version, created_at
            FROM quotations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QuotationRecord::try_from).transpose()
    }
}
