//! Gas-refund fee action.

use crate::action::{Action, ActionContext, RefundRequest, WalletHandle};
use crate::error::ActionError;
use alloy_sol_types::{sol, SolValue};
use sigil_types::ActionType;

sol! {
    struct RefundParams {
        address token;
        uint256 amount;
    }
}

/// Records the refund the submitter is asking for. Moves no funds itself; the
/// verifier settles the request after the main sequence commits, capped by the
/// chain entry's `max_refund_amount`.
pub struct GasRefundAction;

impl Action for GasRefundAction {
    fn protocol_name(&self) -> &str {
        "GasRefund"
    }

    fn action_type(&self) -> ActionType {
        ActionType::Fee
    }

    fn execute(
        &self,
        _wallet: &mut WalletHandle<'_>,
        call_data: &[u8],
        ctx: &mut ActionContext<'_>,
    ) -> Result<serde_json::Value, ActionError> {
        let params = RefundParams::abi_decode(call_data, true)
            .map_err(|err| ActionError::Decode(err.to_string()))?;

        ctx.refund = Some(RefundRequest {
            token: params.token,
            amount: params.amount,
        });

        Ok(serde_json::json!({
            "token": params.token.to_string(),
            "requested": params.amount.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TokenLedger;
    use alloy_primitives::{Address, U256};
    use sigil_registry::ActionRegistry;

    #[test]
    fn records_the_request_without_moving_funds() {
        let registry = ActionRegistry::new(Address::repeat_byte(1), 60);
        let mut ledger = TokenLedger::new();
        let wallet_addr = Address::repeat_byte(2);
        let token = Address::repeat_byte(0xee);
        ledger.mint(token, wallet_addr, U256::from(50));

        let call = RefundParams {
            token,
            amount: U256::from(7),
        }
        .abi_encode();

        let mut wallet = WalletHandle::new(wallet_addr, &mut ledger);
        let mut ctx = ActionContext {
            chain_id: 1,
            timestamp: 0,
            caller: Address::repeat_byte(9),
            strategy_id: 0,
            registry: &registry,
            bundle: None,
            refund: None,
        };

        GasRefundAction.execute(&mut wallet, &call, &mut ctx).unwrap();
        assert_eq!(
            ctx.refund,
            Some(RefundRequest {
                token,
                amount: U256::from(7)
            })
        );
        assert_eq!(ledger.balance_of(token, wallet_addr), U256::from(50));
    }
}
