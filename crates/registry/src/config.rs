//! Governed baseline configuration applied to freshly provisioned wallets.

use crate::error::{RegistryError, Result};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Baseline wallet configuration: trusted modules, guard and fallback
/// handler, applied atomically at provisioning time.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    pub modules: Vec<Address>,
    pub guard: Address,
    pub fallback_handler: Address,
}

/// Single current-config slot with a propose/approve handoff. Unlike the
/// action registry there is no per-item delay; upgrades still require two
/// distinct role holders.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigSlot {
    current: WalletConfig,
    pending: Option<WalletConfig>,
}

impl ConfigSlot {
    pub fn new(initial: WalletConfig) -> Self {
        Self {
            current: initial,
            pending: None,
        }
    }

    pub fn current(&self) -> &WalletConfig {
        &self.current
    }

    pub fn pending(&self) -> Option<&WalletConfig> {
        self.pending.as_ref()
    }

    pub fn propose(&mut self, config: WalletConfig) {
        self.pending = Some(config);
    }

    pub fn approve(&mut self) -> Result<&WalletConfig> {
        let pending = self.pending.take().ok_or(RegistryError::NoPendingConfig)?;
        self.current = pending;
        Ok(&self.current)
    }
}
