//! Deterministic wallet provisioning.
//!
//! Wallet addresses are a pure function of the factory identity, a fixed
//! init-code hash and the owner, so a bundle can be signed for a wallet that
//! does not exist yet on some of its target chains. The same factory address
//! and init-code hash across chains yield the same predicted address
//! everywhere.

use crate::chain::ChainState;
use crate::error::{EngineError, Result};
use crate::events::EngineEvent;
use crate::wallet::WalletState;
use alloy_primitives::{keccak256, Address, B256};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct WalletProvisioner {
    factory: Address,
    init_code_hash: B256,
}

impl WalletProvisioner {
    pub fn new(factory: Address, init_code_hash: B256) -> Self {
        Self {
            factory,
            init_code_hash,
        }
    }

    /// CREATE2-style address prediction, salted by the owner.
    pub fn predict_address(&self, owner: Address) -> Address {
        self.factory
            .create2(keccak256(owner.as_slice()), self.init_code_hash)
    }

    pub fn is_provisioned(&self, state: &ChainState, owner: Address) -> bool {
        state.wallet(self.predict_address(owner)).is_some()
    }

    /// Create the wallet at its predicted address with single-controller
    /// ownership and the registry's current baseline configuration. The
    /// wallet appears fully configured or not at all; provisioning inside a
    /// failed transaction leaves no trace.
    pub fn provision(&self, state: &mut ChainState, owner: Address) -> Result<Address> {
        let wallet = self.predict_address(owner);
        if state.wallet(wallet).is_some() {
            return Err(EngineError::AlreadyProvisioned { owner, wallet });
        }

        let config = state.registry.wallet_config().clone();
        state.insert_wallet(WalletState {
            address: wallet,
            owner,
            modules: config.modules,
            guard: config.guard,
            fallback_handler: config.fallback_handler,
        });
        state.emit(EngineEvent::WalletProvisioned { wallet, owner });
        info!(%wallet, %owner, "wallet provisioned");
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_registry::ActionRegistry;

    fn provisioner() -> WalletProvisioner {
        WalletProvisioner::new(Address::repeat_byte(0xfa), B256::repeat_byte(0x11))
    }

    #[test]
    fn prediction_is_stable_and_owner_dependent() {
        let p = provisioner();
        let owner = Address::repeat_byte(0xab);

        assert_eq!(p.predict_address(owner), p.predict_address(owner));
        assert_ne!(
            p.predict_address(owner),
            p.predict_address(Address::repeat_byte(0xac))
        );
    }

    #[test]
    fn provision_is_not_idempotent() {
        let p = provisioner();
        let mut state = ChainState::new(1, ActionRegistry::new(Address::repeat_byte(1), 60));
        let owner = Address::repeat_byte(0xab);

        let wallet = p.provision(&mut state, owner).unwrap();
        assert_eq!(wallet, p.predict_address(owner));
        assert!(state.wallet(wallet).is_some());
        assert!(p.is_provisioned(&state, owner));

        let err = p.provision(&mut state, owner).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyProvisioned { .. }));
    }
}
