//! Token balances of the modeled chain.

use crate::error::ActionError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balances keyed by `(token, holder)`. Holders are wallets, pools, relayers
/// or any other address the simulation touches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: HashMap<(Address, Address), U256>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Seed a balance out of thin air. Test and scenario setup only.
    pub fn mint(&mut self, token: Address, holder: Address, amount: U256) {
        let entry = self.balances.entry((token, holder)).or_insert(U256::ZERO);
        *entry = entry.saturating_add(amount);
    }

    pub fn credit(
        &mut self,
        token: Address,
        holder: Address,
        amount: U256,
    ) -> Result<(), ActionError> {
        let entry = self.balances.entry((token, holder)).or_insert(U256::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or(ActionError::BalanceOverflow(token))?;
        Ok(())
    }

    pub fn debit(
        &mut self,
        token: Address,
        holder: Address,
        amount: U256,
    ) -> Result<(), ActionError> {
        let available = self.balance_of(token, holder);
        if available < amount {
            return Err(ActionError::InsufficientBalance {
                token,
                needed: amount,
                available,
            });
        }
        self.balances.insert((token, holder), available - amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ActionError> {
        self.debit(token, from, amount)?;
        self.credit(token, to, amount)
    }
}
