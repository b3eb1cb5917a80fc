//! Submission audit trail.
//!
//! Every bundle submission produces one hash-chained record, successful or
//! not, so the relay's history can be verified for gaps or tampering.

use crate::error::Result;
use alloy_primitives::{keccak256, Address};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// Outcome recorded for a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditResult {
    Executed { nonce_consumed: u64 },
    Rejected { error: String },
}

/// One hash-chained audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique submission id.
    pub id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub chain_id: u64,
    pub wallet: Address,
    pub submitter: Address,
    pub result: AuditResult,
    /// Hash of the previous record ("genesis" for the first).
    pub previous_hash: String,
    pub record_hash: String,
}

/// Pluggable record storage.
#[async_trait::async_trait]
pub trait AuditStorage: Send + Sync {
    async fn store(&self, record: &AuditRecord) -> Result<()>;

    async fn records(&self) -> Result<Vec<AuditRecord>>;
}

/// In-memory storage, the default for the simulator.
#[derive(Default)]
pub struct MemoryAuditStorage {
    records: Mutex<Vec<AuditRecord>>,
}

#[async_trait::async_trait]
impl AuditStorage for MemoryAuditStorage {
    async fn store(&self, record: &AuditRecord) -> Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn records(&self) -> Result<Vec<AuditRecord>> {
        Ok(self.records.lock().await.clone())
    }
}

/// Hash-chaining logger over a storage backend.
pub struct AuditLog {
    storage: Arc<dyn AuditStorage>,
    chain_hash: RwLock<String>,
}

impl AuditLog {
    pub fn new(storage: Arc<dyn AuditStorage>) -> Self {
        Self {
            storage,
            chain_hash: RwLock::new("genesis".to_string()),
        }
    }

    /// Record a submission outcome, extending the hash chain.
    pub async fn record(
        &self,
        submission_id: String,
        chain_id: u64,
        wallet: Address,
        submitter: Address,
        result: AuditResult,
    ) -> Result<AuditRecord> {
        let mut chain_hash = self.chain_hash.write().await;

        let mut record = AuditRecord {
            id: submission_id,
            timestamp: chrono::Utc::now(),
            chain_id,
            wallet,
            submitter,
            result,
            previous_hash: chain_hash.clone(),
            record_hash: String::new(),
        };
        record.record_hash = Self::hash(&record);
        *chain_hash = record.record_hash.clone();
        drop(chain_hash);

        self.storage.store(&record).await?;
        info!(id = %record.id, chain_id, %wallet, "audit record stored");
        Ok(record)
    }

    pub async fn records(&self) -> Result<Vec<AuditRecord>> {
        self.storage.records().await
    }

    /// Walk the stored chain and confirm every link.
    pub async fn verify_chain(&self) -> Result<bool> {
        let records = self.storage.records().await?;
        let mut previous = "genesis".to_string();
        for record in &records {
            if record.previous_hash != previous || record.record_hash != Self::hash(record) {
                return Ok(false);
            }
            previous = record.record_hash.clone();
        }
        Ok(true)
    }

    fn hash(record: &AuditRecord) -> String {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(record.id.as_bytes());
        bytes.extend_from_slice(record.timestamp.to_rfc3339().as_bytes());
        bytes.extend_from_slice(&record.chain_id.to_be_bytes());
        bytes.extend_from_slice(record.wallet.as_slice());
        bytes.extend_from_slice(record.submitter.as_slice());
        bytes.extend_from_slice(record.previous_hash.as_bytes());
        hex::encode(keccak256(&bytes))
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(Arc::new(MemoryAuditStorage::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_chain_and_verify() {
        let log = AuditLog::default();

        let first = log
            .record(
                uuid::Uuid::new_v4().to_string(),
                1,
                Address::repeat_byte(2),
                Address::repeat_byte(9),
                AuditResult::Executed { nonce_consumed: 0 },
            )
            .await
            .unwrap();
        let second = log
            .record(
                uuid::Uuid::new_v4().to_string(),
                1,
                Address::repeat_byte(2),
                Address::repeat_byte(9),
                AuditResult::Rejected {
                    error: "expired".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(first.previous_hash, "genesis");
        assert_eq!(second.previous_hash, first.record_hash);
        assert!(log.verify_chain().await.unwrap());
        assert_eq!(log.records().await.unwrap().len(), 2);
    }
}
