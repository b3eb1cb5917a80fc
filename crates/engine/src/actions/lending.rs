//! Lending-style supply/withdraw pair.
//!
//! Pools are resolved through the governed pool registry; the supplied
//! position is modeled as a receipt balance keyed by the pool's address.

use crate::action::{Action, ActionContext, WalletHandle};
use crate::error::ActionError;
use alloy_sol_types::{sol, SolValue};
use sigil_registry::PoolKey;
use sigil_types::{ActionType, PoolId};

sol! {
    struct SupplyParams {
        bytes4 poolId;
        address token;
        uint256 amount;
    }

    struct WithdrawParams {
        bytes4 poolId;
        address token;
        uint256 amount;
    }
}

/// Supply `token` into a registered pool of `protocol`.
pub struct DepositAction {
    protocol: String,
}

impl DepositAction {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
        }
    }
}

impl Action for DepositAction {
    fn protocol_name(&self) -> &str {
        &self.protocol
    }

    fn action_type(&self) -> ActionType {
        ActionType::Deposit
    }

    fn execute(
        &self,
        wallet: &mut WalletHandle<'_>,
        call_data: &[u8],
        ctx: &mut ActionContext<'_>,
    ) -> Result<serde_json::Value, ActionError> {
        let params = SupplyParams::abi_decode(call_data, true)
            .map_err(|err| ActionError::Decode(err.to_string()))?;

        let key = PoolKey::new(self.protocol.clone(), PoolId::new(params.poolId.0));
        let pool = ctx.registry.resolve_pool(&key)?;

        wallet.debit(params.token, params.amount)?;
        wallet.credit(pool, params.amount)?;

        Ok(serde_json::json!({
            "pool": pool.to_string(),
            "token": params.token.to_string(),
            "amount": params.amount.to_string(),
        }))
    }
}

/// Redeem a receipt balance back into the underlying token.
pub struct WithdrawAction {
    protocol: String,
}

impl WithdrawAction {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
        }
    }
}

impl Action for WithdrawAction {
    fn protocol_name(&self) -> &str {
        &self.protocol
    }

    fn action_type(&self) -> ActionType {
        ActionType::Withdraw
    }

    fn execute(
        &self,
        wallet: &mut WalletHandle<'_>,
        call_data: &[u8],
        ctx: &mut ActionContext<'_>,
    ) -> Result<serde_json::Value, ActionError> {
        let params = WithdrawParams::abi_decode(call_data, true)
            .map_err(|err| ActionError::Decode(err.to_string()))?;

        let key = PoolKey::new(self.protocol.clone(), PoolId::new(params.poolId.0));
        let pool = ctx.registry.resolve_pool(&key)?;

        wallet.debit(pool, params.amount)?;
        wallet.credit(params.token, params.amount)?;

        Ok(serde_json::json!({
            "pool": pool.to_string(),
            "token": params.token.to_string(),
            "amount": params.amount.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TokenLedger;
    use alloy_primitives::{Address, U256};
    use sigil_registry::{ActionRegistry, Role};

    fn registry_with_pool(pool: Address) -> (ActionRegistry, PoolId) {
        let owner = Address::repeat_byte(1);
        let mut reg = ActionRegistry::new(owner, 60);
        reg.grant_role(owner, Role::PoolProposer, owner).unwrap();
        reg.grant_role(owner, Role::PoolExecutor, owner).unwrap();

        let pool_id = PoolId::from_address(pool);
        let key = PoolKey::new("AaveV3", pool_id);
        reg.propose_pool(owner, key.clone(), pool, 0).unwrap();
        reg.execute_pool(owner, &key, pool, 60).unwrap();
        (reg, pool_id)
    }

    fn ctx(registry: &ActionRegistry) -> ActionContext<'_> {
        ActionContext {
            chain_id: 1,
            timestamp: 0,
            caller: Address::repeat_byte(9),
            strategy_id: 0,
            registry,
            bundle: None,
            refund: None,
        }
    }

    #[test]
    fn supply_then_withdraw_round_trips() {
        let pool = Address::repeat_byte(0xcc);
        let (registry, pool_id) = registry_with_pool(pool);

        let mut ledger = TokenLedger::new();
        let wallet_addr = Address::repeat_byte(2);
        let token = Address::repeat_byte(0xee);
        ledger.mint(token, wallet_addr, U256::from(100));

        let deposit = DepositAction::new("AaveV3");
        let call = SupplyParams {
            poolId: pool_id.0.into(),
            token,
            amount: U256::from(60),
        }
        .abi_encode();
        let mut wallet = WalletHandle::new(wallet_addr, &mut ledger);
        deposit
            .execute(&mut wallet, &call, &mut ctx(&registry))
            .unwrap();

        assert_eq!(ledger.balance_of(token, wallet_addr), U256::from(40));
        assert_eq!(ledger.balance_of(pool, wallet_addr), U256::from(60));

        let withdraw = WithdrawAction::new("AaveV3");
        let call = WithdrawParams {
            poolId: pool_id.0.into(),
            token,
            amount: U256::from(60),
        }
        .abi_encode();
        let mut wallet = WalletHandle::new(wallet_addr, &mut ledger);
        withdraw
            .execute(&mut wallet, &call, &mut ctx(&registry))
            .unwrap();

        assert_eq!(ledger.balance_of(token, wallet_addr), U256::from(100));
        assert_eq!(ledger.balance_of(pool, wallet_addr), U256::ZERO);
    }

    #[test]
    fn unknown_pool_fails_closed() {
        let registry = ActionRegistry::new(Address::repeat_byte(1), 60);
        let mut ledger = TokenLedger::new();
        let mut wallet = WalletHandle::new(Address::repeat_byte(2), &mut ledger);

        let call = SupplyParams {
            poolId: [9, 9, 9, 9].into(),
            token: Address::repeat_byte(0xee),
            amount: U256::from(1),
        }
        .abi_encode();

        let err = DepositAction::new("AaveV3")
            .execute(&mut wallet, &call, &mut ctx(&registry))
            .unwrap_err();
        assert!(matches!(err, ActionError::Registry(_)));
    }
}
