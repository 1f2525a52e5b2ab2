//! Persistence contract for issued quotations.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::QuotationRecord;

/// Write-once store of quotation snapshots
#[async_trait]
pub trait QuotationStore: Send + Sync {
    /// Persist a new record. Must either store it durably or fail.
    async fn insert(&self, record: &QuotationRecord) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<QuotationRecord>>;
}

/// Quotation store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryQuotationStore {
    records: RwLock<HashMap<Uuid, QuotationRecord>>,
}

impl InMemoryQuotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl QuotationStore for InMemoryQuotationStore {
    async fn insert(&self, record: &QuotationRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(AppError::Internal(format!(
                "quotation {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<QuotationRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}
