//! Modeled user wallet: the execution context that owns funds.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Configuration and ownership of one provisioned wallet. Balances live in
/// the chain's [`TokenLedger`](crate::ledger::TokenLedger), keyed by the
/// wallet address.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct WalletState {
    pub address: Address,
    /// Single controller authorized to sign bundles for this wallet.
    pub owner: Address,
    /// Trusted modules enabled at provisioning time.
    pub modules: Vec<Address>,
    pub guard: Address,
    pub fallback_handler: Address,
}

impl WalletState {
    pub fn is_controller(&self, who: Address) -> bool {
        self.owner == who
    }
}
