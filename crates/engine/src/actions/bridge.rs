//! Bundle-aware bridge action.
//!
//! Bridging is the one case where an action needs more than its own calldata:
//! the relayer on the destination chain replays the very same signed bundle,
//! so the action re-embeds the bundle and its signature in the message it
//! emits.

use crate::action::{Action, ActionContext, ActionKind, WalletHandle};
use crate::error::ActionError;
use alloy_sol_types::{sol, SolValue};
use sigil_types::ActionType;

sol! {
    struct BridgeParams {
        uint64 destinationChainId;
        address token;
        uint256 amount;
    }
}

pub struct BridgeAction;

impl Action for BridgeAction {
    fn protocol_name(&self) -> &str {
        "Bridge"
    }

    fn action_type(&self) -> ActionType {
        ActionType::Bridge
    }

    fn kind(&self) -> ActionKind {
        ActionKind::BundleAware
    }

    fn execute(
        &self,
        wallet: &mut WalletHandle<'_>,
        call_data: &[u8],
        ctx: &mut ActionContext<'_>,
    ) -> Result<serde_json::Value, ActionError> {
        let params = BridgeParams::abi_decode(call_data, true)
            .map_err(|err| ActionError::Decode(err.to_string()))?;

        let bundle_ctx = ctx.bundle.ok_or(ActionError::MissingBundleContext)?;
        let destination_known = bundle_ctx
            .bundle
            .sequences
            .iter()
            .any(|cs| cs.chain_id == params.destinationChainId);
        if !destination_known {
            return Err(ActionError::Other(format!(
                "bundle has no sequence for destination chain {}",
                params.destinationChainId
            )));
        }

        // Escrowed with the bridge; released on the destination chain.
        wallet.debit(params.token, params.amount)?;

        Ok(serde_json::json!({
            "destination_chain_id": params.destinationChainId,
            "token": params.token.to_string(),
            "amount": params.amount.to_string(),
            "bundle_expiry": bundle_ctx.bundle.expiry,
            "signature": hex::encode(bundle_ctx.signature),
        }))
    }
}
