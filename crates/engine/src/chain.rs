//! One modeled chain: registry, ledger, wallets, deployed actions, nonces and
//! the committed event journal.

use crate::action::Action;
use crate::error::Result;
use crate::events::EngineEvent;
use crate::ledger::TokenLedger;
use crate::wallet::WalletState;
use alloy_primitives::Address;
use sigil_registry::ActionRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Complete state of one chain in the simulation. Cloneable so a whole chain
/// can be snapshotted for transactional execution or preflighted without
/// committing.
#[derive(Clone)]
pub struct ChainState {
    chain_id: u64,
    timestamp: u64,
    pub registry: ActionRegistry,
    pub ledger: TokenLedger,
    wallets: HashMap<Address, WalletState>,
    deployed_actions: HashMap<Address, Arc<dyn Action>>,
    nonces: HashMap<Address, u64>,
    events: Vec<EngineEvent>,
    log_counter: u64,
}

impl ChainState {
    pub fn new(chain_id: u64, registry: ActionRegistry) -> Self {
        Self {
            chain_id,
            timestamp: 0,
            registry,
            ledger: TokenLedger::new(),
            wallets: HashMap::new(),
            deployed_actions: HashMap::new(),
            nonces: HashMap::new(),
            events: Vec::new(),
            log_counter: 0,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    /// Place an action contract at an address. Registration in the registry
    /// is separate and governed.
    pub fn deploy_action(&mut self, address: Address, action: Arc<dyn Action>) {
        self.deployed_actions.insert(address, action);
    }

    pub fn action_at(&self, address: Address) -> Option<&Arc<dyn Action>> {
        self.deployed_actions.get(&address)
    }

    /// The wallet's next expected sequence nonce. Implicitly zero.
    pub fn nonce_of(&self, wallet: Address) -> u64 {
        self.nonces.get(&wallet).copied().unwrap_or(0)
    }

    /// Consume the wallet's current nonce. Called exactly once per
    /// successfully executed chain sequence, by the verifier only.
    pub(crate) fn bump_nonce(&mut self, wallet: Address) {
        *self.nonces.entry(wallet).or_insert(0) += 1;
    }

    pub fn wallet(&self, address: Address) -> Option<&WalletState> {
        self.wallets.get(&address)
    }

    pub(crate) fn insert_wallet(&mut self, wallet: WalletState) {
        self.wallets.insert(wallet.address, wallet);
    }

    pub fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub(crate) fn next_log_id(&mut self) -> u64 {
        let id = self.log_counter;
        self.log_counter += 1;
        id
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run `f` atomically: on error every state change — balances, wallets,
    /// nonces, registry, events — is rolled back, modeling the substrate's
    /// native all-or-nothing transaction semantics.
    pub fn transact<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainState")
            .field("chain_id", &self.chain_id)
            .field("timestamp", &self.timestamp)
            .field("wallets", &self.wallets.len())
            .field("deployed_actions", &self.deployed_actions.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use alloy_primitives::U256;

    fn state() -> ChainState {
        ChainState::new(1, ActionRegistry::new(Address::repeat_byte(1), 60))
    }

    #[test]
    fn transact_commits_on_success() {
        let mut st = state();
        let token = Address::repeat_byte(0xee);

        st.transact(|st| {
            st.ledger.mint(token, Address::repeat_byte(2), U256::from(5));
            st.bump_nonce(Address::repeat_byte(2));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            st.ledger.balance_of(token, Address::repeat_byte(2)),
            U256::from(5)
        );
        assert_eq!(st.nonce_of(Address::repeat_byte(2)), 1);
    }

    #[test]
    fn transact_rolls_back_on_error() {
        let mut st = state();
        let token = Address::repeat_byte(0xee);
        let wallet = Address::repeat_byte(2);
        st.ledger.mint(token, wallet, U256::from(100));

        let result: Result<()> = st.transact(|st| {
            st.ledger.debit(token, wallet, U256::from(100)).unwrap();
            st.bump_nonce(wallet);
            st.emit(EngineEvent::BundleExecuted {
                wallet,
                chain_id: 1,
                nonce: 0,
            });
            Err(EngineError::WalletNotProvisioned(wallet))
        });

        assert!(result.is_err());
        assert_eq!(st.ledger.balance_of(token, wallet), U256::from(100));
        assert_eq!(st.nonce_of(wallet), 0);
        assert!(st.events().is_empty());
    }
}
