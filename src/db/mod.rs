//! PostgreSQL pool and schema bootstrap

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

/// Idempotent DDL applied at startup.
///
/// The primary keys on `rate_entries` and `court_standard_areas` are what make
/// concurrent catalog bootstrap safe.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS rate_entries (
        sport           TEXT        NOT NULL,
        size_tier       TEXT        NOT NULL,
        base_area_rate  NUMERIC     NOT NULL CHECK (base_area_rate >= 0),
        tier_multiplier NUMERIC     NOT NULL CHECK (tier_multiplier >= 1),
        add_on_prices   JSONB       NOT NULL DEFAULT '{}'::jsonb,
        currency        TEXT        NOT NULL,
        version         BIGINT      NOT NULL DEFAULT 1,
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (sport, size_tier)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS court_standard_areas (
        sport         TEXT    PRIMARY KEY,
        standard_area NUMERIC NOT NULL CHECK (standard_area > 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quotations (
        id                     UUID        PRIMARY KEY,
        sport                  TEXT        NOT NULL,
        size_tier              TEXT        NOT NULL,
        court_specification    JSONB       NOT NULL,
        resolved_area          NUMERIC     NOT NULL,
        line_items             JSONB       NOT NULL,
        total                  NUMERIC     NOT NULL,
        currency               TEXT        NOT NULL,
        base_area_rate         NUMERIC     NOT NULL,
        tier_multiplier        NUMERIC     NOT NULL,
        rates_snapshot_version BIGINT      NOT NULL,
        created_at             TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS quotations_created_at_idx ON quotations (created_at)
    "#,
];

/// Open the connection pool
pub async fn connect(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.store_timeout)
        .connect(&config.database_url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Advisory lock key held while applying the schema
const SCHEMA_LOCK_KEY: i64 = 0x636f_7572_7473;

/// Create tables and constraints if they do not exist.
///
/// `CREATE ... IF NOT EXISTS` is not race-free across sessions, so instances
/// starting together take turns under a transaction-scoped advisory lock.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    info!("Database schema is up to date");
    Ok(())
}

/// Round-trip a trivial query
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
