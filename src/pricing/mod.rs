//! Quotation pricing engine for sports-court construction.
//!
//! Turns a court request into an itemized, persisted quotation. Issued
//! quotations are snapshots: they carry the rates actually used and are never
//! re-priced when the catalog changes.

pub mod calculators;
pub mod catalog;
pub mod dimensions;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used items
pub use calculators::round_money;
pub use catalog::{ensure_defaults, InMemoryRateCatalog, RateCatalog};
pub use queries::{PgQuotationStore, PgRateCatalog};
pub use routes::router;
pub use services::{PricingError, QuotationEngine};
pub use store::{InMemoryQuotationStore, QuotationStore};
