//! Plain token transfer out of the wallet.

use crate::action::{Action, ActionContext, WalletHandle};
use crate::error::ActionError;
use alloy_sol_types::{sol, SolValue};
use sigil_types::ActionType;

sol! {
    struct TransferParams {
        address token;
        address recipient;
        uint256 amount;
    }
}

pub struct TransferAction;

impl Action for TransferAction {
    fn protocol_name(&self) -> &str {
        "Erc20"
    }

    fn action_type(&self) -> ActionType {
        ActionType::Transfer
    }

    fn execute(
        &self,
        wallet: &mut WalletHandle<'_>,
        call_data: &[u8],
        _ctx: &mut ActionContext<'_>,
    ) -> Result<serde_json::Value, ActionError> {
        let params = TransferParams::abi_decode(call_data, true)
            .map_err(|err| ActionError::Decode(err.to_string()))?;

        wallet.withdraw_to(params.token, params.recipient, params.amount)?;

        Ok(serde_json::json!({
            "token": params.token.to_string(),
            "recipient": params.recipient.to_string(),
            "amount": params.amount.to_string(),
        }))
    }
}
