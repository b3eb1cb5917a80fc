//! Engine-level audit events, committed together with the state they describe.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use sigil_types::ActionType;

/// Events recorded by the engine. Action-level side effects all flow through
/// the single `Action` channel carrying `(caller, log_id, payload)`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum EngineEvent {
    WalletProvisioned {
        wallet: Address,
        owner: Address,
    },
    Action {
        caller: Address,
        log_id: u64,
        wallet: Address,
        protocol: String,
        action_type: ActionType,
        payload: serde_json::Value,
    },
    BundleExecuted {
        wallet: Address,
        chain_id: u64,
        /// The nonce value this execution consumed.
        nonce: u64,
    },
    RefundSettled {
        wallet: Address,
        recipient: Address,
        token: Address,
        amount: U256,
    },
    RefundFailed {
        wallet: Address,
        reason: String,
    },
}
