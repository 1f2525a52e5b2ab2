use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use court_quote::cache::CachedRateCatalog;
use court_quote::config::Config;
use court_quote::pricing::{
    ensure_defaults, PgQuotationStore, PgRateCatalog, QuotationEngine, RateCatalog,
};
use court_quote::{app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "court_quote=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting court quotation service");

    let pool = db::connect(&config).await.context("connecting to PostgreSQL")?;
    db::apply_schema(&pool).await.context("applying database schema")?;

    let catalog: Arc<dyn RateCatalog> = Arc::new(CachedRateCatalog::new(
        Arc::new(PgRateCatalog::new(pool.clone())),
        config.rate_cache_ttl,
        config.rate_cache_capacity,
    ));
    ensure_defaults(catalog.as_ref())
        .await
        .context("initializing default pricing data")?;

    let engine = QuotationEngine::new(
        catalog,
        Arc::new(PgQuotationStore::new(pool.clone())),
        config.store_timeout,
    );
    let state = AppState {
        engine,
        db: Some(pool),
    };

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
