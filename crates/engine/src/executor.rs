//! Positional sequence execution against one wallet.

use crate::action::{Action, ActionContext, ActionKind, BundleContext, RefundRequest, WalletHandle};
use crate::chain::ChainState;
use crate::error::{EngineError, Result};
use crate::events::EngineEvent;
use alloy_primitives::Address;
use sigil_types::{ActionType, Bundle, Sequence};
use std::sync::Arc;
use tracing::debug;

/// Runs sequences action by action. Holds no state of its own; atomicity comes
/// from running inside [`ChainState::transact`].
pub struct SequenceExecutor;

impl SequenceExecutor {
    /// Execute every action in `sequence`, in order, against `wallet`.
    ///
    /// Resolution is eager: all action identifiers are resolved through the
    /// registry and checked for a deployed implementation before the first
    /// action runs. Returns the refund request recorded by a fee action, if
    /// any. Does not touch nonces; the caller owns nonce consumption.
    pub(crate) fn run(
        state: &mut ChainState,
        wallet: Address,
        sequence: &Sequence,
        bundle: Option<(&Bundle, &[u8])>,
        caller: Address,
        strategy_id: u16,
    ) -> Result<Option<RefundRequest>> {
        sequence.check_lengths()?;

        let mut actions: Vec<Arc<dyn Action>> = Vec::with_capacity(sequence.len());
        for id in &sequence.action_ids {
            let address = state
                .registry
                .resolve_action(*id)
                .map_err(|_| EngineError::UnresolvedAction(*id))?;
            let action = state
                .action_at(address)
                .ok_or(EngineError::ActionNotDeployed(address))?;
            actions.push(Arc::clone(action));
        }

        let chain_id = state.chain_id();
        let timestamp = state.timestamp();
        let mut records: Vec<(String, ActionType, serde_json::Value)> =
            Vec::with_capacity(actions.len());

        let mut ctx = ActionContext {
            chain_id,
            timestamp,
            caller,
            strategy_id,
            registry: &state.registry,
            bundle: None,
            refund: None,
        };

        for (index, action) in actions.iter().enumerate() {
            ctx.bundle = match action.kind() {
                ActionKind::Simple => None,
                ActionKind::BundleAware => bundle.map(|(bundle, signature)| BundleContext {
                    bundle,
                    signature,
                }),
            };

            debug!(
                sequence = %sequence.name,
                index,
                protocol = action.protocol_name(),
                "executing action"
            );

            let mut handle = WalletHandle::new(wallet, &mut state.ledger);
            let payload = action
                .execute(&mut handle, &sequence.call_data[index], &mut ctx)
                .map_err(|err| EngineError::ActionExecutionFailure {
                    index,
                    name: sequence.actions[index].protocol_name.clone(),
                    reason: err.to_string(),
                })?;

            records.push((
                action.protocol_name().to_string(),
                action.action_type(),
                payload,
            ));
        }

        let refund = ctx.refund;

        for (protocol, action_type, payload) in records {
            let log_id = state.next_log_id();
            state.emit(EngineEvent::Action {
                caller,
                log_id,
                wallet,
                protocol,
                action_type,
                payload,
            });
        }

        Ok(refund)
    }

    /// Direct execution by a wallet controller, outside any signed bundle.
    ///
    /// No nonce is consumed and no refund is settled; the controller pays
    /// their own way. The whole sequence is still atomic.
    pub fn execute_direct(
        state: &mut ChainState,
        wallet: Address,
        sequence: &Sequence,
        caller: Address,
    ) -> Result<()> {
        let wallet_state = state
            .wallet(wallet)
            .ok_or(EngineError::WalletNotProvisioned(wallet))?;
        if !wallet_state.is_controller(caller) {
            return Err(EngineError::UnauthorizedExecutorCall { caller, wallet });
        }

        state.transact(|state| {
            Self::run(state, wallet, sequence, None, caller, 0)?;
            Ok(())
        })
    }
}
