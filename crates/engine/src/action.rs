//! The action seam: the interface every executable unit implements, and the
//! capability handle it receives.
//!
//! Actions never run "as" a contract the way the on-chain system delegates
//! into them; instead each action gets a mutable handle to the wallet's
//! resources and a read view of the registry. Bundle awareness is a declared
//! tag, not a runtime capability probe: the executor branches on
//! [`ActionKind`] to decide whether the originating bundle travels along.

use crate::error::ActionError;
use crate::ledger::TokenLedger;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use sigil_registry::ActionRegistry;
use sigil_types::{ActionType, Bundle};

/// Whether an action receives the originating bundle alongside its calldata.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ActionKind {
    /// Receives only its own calldata.
    Simple,
    /// Additionally receives the full bundle and signature, so it can
    /// re-embed them for a downstream chain (bridge-style actions).
    BundleAware,
}

/// The originating bundle, passed through to bundle-aware actions.
#[derive(Clone, Copy, Debug)]
pub struct BundleContext<'a> {
    pub bundle: &'a Bundle,
    pub signature: &'a [u8],
}

/// A refund recorded by a fee action during execution, settled by the
/// verifier after the main sequence commits.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RefundRequest {
    pub token: Address,
    pub amount: U256,
}

/// Per-sequence execution context shared by all actions in the sequence.
pub struct ActionContext<'a> {
    pub chain_id: u64,
    pub timestamp: u64,
    /// The account that submitted the transaction.
    pub caller: Address,
    pub strategy_id: u16,
    pub registry: &'a ActionRegistry,
    /// Present only while executing a bundle-aware action.
    pub bundle: Option<BundleContext<'a>>,
    /// Written by fee actions, consumed by refund settlement.
    pub refund: Option<RefundRequest>,
}

/// Mutable capability over one wallet's funds. All balance changes an action
/// performs land in the wallet, never in the executor.
pub struct WalletHandle<'a> {
    address: Address,
    ledger: &'a mut TokenLedger,
}

impl<'a> WalletHandle<'a> {
    pub fn new(address: Address, ledger: &'a mut TokenLedger) -> Self {
        Self { address, ledger }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance(&self, token: Address) -> U256 {
        self.ledger.balance_of(token, self.address)
    }

    /// Move wallet funds to an external recipient.
    pub fn withdraw_to(
        &mut self,
        token: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), ActionError> {
        self.ledger.transfer(token, self.address, recipient, amount)
    }

    /// Burn wallet funds (e.g. supplied into a pool).
    pub fn debit(&mut self, token: Address, amount: U256) -> Result<(), ActionError> {
        self.ledger.debit(token, self.address, amount)
    }

    /// Mint funds to the wallet (e.g. a receipt token or a redemption).
    pub fn credit(&mut self, token: Address, amount: U256) -> Result<(), ActionError> {
        self.ledger.credit(token, self.address, amount)
    }
}

/// A self-contained unit of protocol logic, registered by identifier and
/// invoked positionally from a sequence.
///
/// `protocol_name` and `action_type` are the action's self-reported identity;
/// the verifier requires them to equal the signed [`ActionDefinition`]
/// (`sigil_types::ActionDefinition`) before anything executes.
pub trait Action: Send + Sync {
    fn protocol_name(&self) -> &str;

    fn action_type(&self) -> ActionType;

    fn kind(&self) -> ActionKind {
        ActionKind::Simple
    }

    /// Execute against the wallet. Returns a structured payload for the
    /// action event channel; any error aborts the whole sequence.
    fn execute(
        &self,
        wallet: &mut WalletHandle<'_>,
        call_data: &[u8],
        ctx: &mut ActionContext<'_>,
    ) -> Result<serde_json::Value, ActionError>;
}
