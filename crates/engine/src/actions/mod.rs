//! Built-in modeled actions.
//!
//! These are simulation collaborators, not protocol adapters: enough behavior
//! to exercise every verification and execution path (balance moves, pool
//! resolution, refund recording, bundle-aware dispatch) without any real
//! protocol semantics.

mod bridge;
mod fee;
mod lending;
mod transfer;

pub use bridge::{BridgeAction, BridgeParams};
pub use fee::{GasRefundAction, RefundParams};
pub use lending::{DepositAction, SupplyParams, WithdrawAction, WithdrawParams};
pub use transfer::{TransferAction, TransferParams};
