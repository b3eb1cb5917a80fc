//! Relay companion service.
//!
//! Hosts one execution engine per chain behind an async write lock, so bundle
//! submissions for the same chain execute strictly one at a time, mirroring
//! the substrate's total ordering. Committed engine and governance events are
//! re-broadcast on a tokio broadcast channel, and every submission leaves a
//! hash-chained audit record.
//!
//! The service holds no keys: it receives already-signed bundles and replays
//! them against modeled state, either for real (`submit_bundle`) or against a
//! throwaway copy (`preflight`).

use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use sigil_engine::{BundleVerifier, ChainState, ExecutionReceipt, WalletProvisioner};
use sigil_types::Bundle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub mod audit;
pub mod error;
pub mod event_stream;

pub use audit::{AuditLog, AuditRecord, AuditResult, AuditStorage, MemoryAuditStorage};
pub use error::{RelayError, Result};
pub use event_stream::{EventFilter, EventStream, FilteredEventStream, RelayEvent};

/// Install a global `tracing` subscriber configured from `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Relay service configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Broadcast channel capacity for relay events.
    pub event_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            event_capacity: 1_000,
        }
    }
}

/// One signed-bundle submission.
#[derive(Clone, Debug)]
pub struct Submission {
    pub chain_id: u64,
    pub wallet: Address,
    pub bundle: Bundle,
    /// 65-byte `r || s || v` signature over the bundle digest.
    pub signature: Vec<u8>,
    /// Account credited when the refund recipient is the executor.
    pub submitter: Address,
    pub strategy_id: u16,
}

struct ChainHost {
    state: ChainState,
    provisioner: WalletProvisioner,
}

/// Per-chain engines plus the event and audit plumbing around them.
pub struct RelayService {
    chains: DashMap<u64, Arc<RwLock<ChainHost>>>,
    events: Arc<EventStream>,
    audit: Arc<AuditLog>,
}

impl RelayService {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            chains: DashMap::new(),
            events: Arc::new(EventStream::new(config.event_capacity)),
            audit: Arc::new(AuditLog::default()),
        }
    }

    /// Register a chain. Replaces any previous engine for the same id.
    pub fn add_chain(&self, state: ChainState, provisioner: WalletProvisioner) {
        let chain_id = state.chain_id();
        info!(chain_id, "chain registered with relay");
        self.chains.insert(
            chain_id,
            Arc::new(RwLock::new(ChainHost { state, provisioner })),
        );
    }

    pub async fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RelayEvent> {
        self.events.subscribe().await
    }

    pub async fn subscribe_filtered(&self, filter: EventFilter) -> FilteredEventStream {
        FilteredEventStream::new(self.events.subscribe().await, filter)
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Verify and execute a signed bundle on its target chain.
    ///
    /// Submissions for the same chain are serialized by the chain's write
    /// lock; two racing submissions for the same wallet resolve exactly the
    /// way they would on-chain, with one consuming the nonce and the other
    /// failing sequence selection.
    pub async fn submit_bundle(&self, submission: &Submission) -> Result<ExecutionReceipt> {
        let host = self.host(submission.chain_id)?;
        let submission_id = uuid::Uuid::new_v4().to_string();

        self.events.emit(RelayEvent::Received {
            submission_id: submission_id.clone(),
            chain_id: submission.chain_id,
            wallet: submission.wallet,
        });

        let result = {
            let mut host = host.write().await;
            let ChainHost { state, provisioner } = &mut *host;
            let result = BundleVerifier::execute_bundle(
                state,
                provisioner,
                submission.wallet,
                &submission.bundle,
                &submission.signature,
                submission.submitter,
                submission.strategy_id,
            );

            for event in state.drain_events() {
                self.events.emit(RelayEvent::Engine {
                    chain_id: submission.chain_id,
                    event,
                });
            }
            for event in state.registry.take_events() {
                self.events.emit(RelayEvent::Governance {
                    chain_id: submission.chain_id,
                    event,
                });
            }
            result
        };

        match &result {
            Ok(receipt) => {
                self.events.emit(RelayEvent::Executed {
                    submission_id: submission_id.clone(),
                    chain_id: submission.chain_id,
                    wallet: submission.wallet,
                    nonce_consumed: receipt.nonce_consumed,
                });
                self.audit
                    .record(
                        submission_id,
                        submission.chain_id,
                        submission.wallet,
                        submission.submitter,
                        AuditResult::Executed {
                            nonce_consumed: receipt.nonce_consumed,
                        },
                    )
                    .await?;
            }
            Err(err) => {
                self.events.emit(RelayEvent::Failed {
                    submission_id: submission_id.clone(),
                    chain_id: submission.chain_id,
                    wallet: submission.wallet,
                    error: err.to_string(),
                });
                self.audit
                    .record(
                        submission_id,
                        submission.chain_id,
                        submission.wallet,
                        submission.submitter,
                        AuditResult::Rejected {
                            error: err.to_string(),
                        },
                    )
                    .await?;
            }
        }

        Ok(result?)
    }

    /// Replay a submission against a throwaway copy of the chain state and
    /// report the outcome without committing anything or emitting events.
    pub async fn preflight(&self, submission: &Submission) -> Result<ExecutionReceipt> {
        let host = self.host(submission.chain_id)?;
        let host = host.read().await;

        let mut scratch = host.state.clone();
        let receipt = BundleVerifier::execute_bundle(
            &mut scratch,
            &host.provisioner,
            submission.wallet,
            &submission.bundle,
            &submission.signature,
            submission.submitter,
            submission.strategy_id,
        )?;
        Ok(receipt)
    }

    /// Advance the chain's modeled block timestamp.
    pub async fn advance_time(&self, chain_id: u64, seconds: u64) -> Result<()> {
        let host = self.host(chain_id)?;
        host.write().await.state.advance_time(seconds);
        Ok(())
    }

    pub async fn set_timestamp(&self, chain_id: u64, timestamp: u64) -> Result<()> {
        let host = self.host(chain_id)?;
        host.write().await.state.set_timestamp(timestamp);
        Ok(())
    }

    /// Read access to one chain's state.
    pub async fn with_chain<T>(
        &self,
        chain_id: u64,
        f: impl FnOnce(&ChainState) -> T,
    ) -> Result<T> {
        let host = self.host(chain_id)?;
        let host = host.read().await;
        Ok(f(&host.state))
    }

    /// Mutable access to one chain's state, for scenario setup (funding
    /// wallets, registering actions) before submissions start.
    pub async fn with_chain_mut<T>(
        &self,
        chain_id: u64,
        f: impl FnOnce(&mut ChainState) -> T,
    ) -> Result<T> {
        let host = self.host(chain_id)?;
        let mut host = host.write().await;
        Ok(f(&mut host.state))
    }

    pub async fn nonce_of(&self, chain_id: u64, wallet: Address) -> Result<u64> {
        self.with_chain(chain_id, |state| state.nonce_of(wallet))
            .await
    }

    pub async fn balance_of(&self, chain_id: u64, token: Address, holder: Address) -> Result<U256> {
        self.with_chain(chain_id, |state| state.ledger.balance_of(token, holder))
            .await
    }

    fn host(&self, chain_id: u64) -> Result<Arc<RwLock<ChainHost>>> {
        self.chains
            .get(&chain_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(RelayError::UnknownChain(chain_id))
    }
}
