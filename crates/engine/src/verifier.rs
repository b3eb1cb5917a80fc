//! Signed-bundle verification and execution.
//!
//! The verification pipeline mirrors the on-chain entry point: expiry, signer
//! recovery and authorization, chain/nonce sequence selection, optional wallet
//! provisioning, action-identity binding, refund gating, atomic execution,
//! then nonce consumption and post-commit refund settlement.

use crate::action::RefundRequest;
use crate::chain::ChainState;
use crate::error::{EngineError, Result};
use crate::events::EngineEvent;
use crate::executor::SequenceExecutor;
use crate::provisioner::WalletProvisioner;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use sigil_types::{
    bundle_signing_hash, recover_signer, Bundle, ChainSequence, RefundGatingError,
    RefundRecipient,
};
use tracing::{info, warn};

/// How the optional post-execution refund settled. Failure here never unwinds
/// the already-committed sequence.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RefundOutcome {
    Settled {
        recipient: Address,
        token: Address,
        amount: U256,
    },
    Failed {
        reason: String,
    },
}

/// What a successful bundle execution looked like.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub wallet: Address,
    pub chain_id: u64,
    /// The nonce value this execution consumed.
    pub nonce_consumed: u64,
    pub digest: B256,
    pub signer: Address,
    pub refund: Option<RefundOutcome>,
}

/// Stateless verifier. Per-wallet nonces live in [`ChainState`]; this type
/// only sequences the checks.
pub struct BundleVerifier;

impl BundleVerifier {
    /// Verify and execute the chain-matching entry of a signed bundle.
    ///
    /// Replay protection: a successful execution consumes the wallet's
    /// current nonce, so resubmitting the same `(bundle, signature)` fails
    /// sequence selection. Each chain keeps an independent counter, which is
    /// what lets one signature serve every chain in the bundle.
    pub fn execute_bundle(
        state: &mut ChainState,
        provisioner: &WalletProvisioner,
        wallet: Address,
        bundle: &Bundle,
        signature: &[u8],
        submitter: Address,
        strategy_id: u16,
    ) -> Result<ExecutionReceipt> {
        let now = state.timestamp();
        if now > bundle.expiry {
            return Err(EngineError::Expired {
                expiry: bundle.expiry,
                now,
            });
        }

        let digest = bundle_signing_hash(bundle, wallet);
        let signer = recover_signer(digest, signature)?;
        Self::check_authorization(state, provisioner, wallet, signer)?;

        let expected_nonce = state.nonce_of(wallet);
        let chain_id = state.chain_id();
        let cs = bundle
            .sequence_for(chain_id, expected_nonce)
            .ok_or(EngineError::NoMatchingSequence {
                chain_id,
                expected_nonce,
            })?;

        let wallet_exists = state.wallet(wallet).is_some();
        if !wallet_exists && !cs.deploy_wallet {
            return Err(EngineError::WalletNotProvisioned(wallet));
        }

        cs.sequence.check_lengths()?;
        Self::check_action_identities(state, cs)?;

        let refund_due = cs.check_refund_gating().map_err(|err| match err {
            RefundGatingError::FeeActionRequired => EngineError::FeeActionRequired,
            RefundGatingError::FeeActionForbidden => EngineError::FeeActionForbidden,
        })?;

        let refund_request = state.transact(|state| {
            if !wallet_exists {
                provisioner.provision(state, signer)?;
            }
            let refund = SequenceExecutor::run(
                state,
                wallet,
                &cs.sequence,
                Some((bundle, signature)),
                submitter,
                strategy_id,
            )?;
            state.bump_nonce(wallet);
            state.emit(EngineEvent::BundleExecuted {
                wallet,
                chain_id,
                nonce: expected_nonce,
            });
            Ok(refund)
        })?;

        let refund = if refund_due {
            Some(Self::settle_refund(
                state,
                wallet,
                cs,
                submitter,
                refund_request,
            ))
        } else {
            None
        };

        info!(%wallet, chain_id, nonce = expected_nonce, %signer, "bundle executed");

        Ok(ExecutionReceipt {
            wallet,
            chain_id,
            nonce_consumed: expected_nonce,
            digest,
            signer,
            refund,
        })
    }

    /// A signer controls an existing wallet if the wallet says so; for a
    /// wallet that does not exist yet, control means the wallet address is
    /// the signer's own predicted provisioning address.
    fn check_authorization(
        state: &ChainState,
        provisioner: &WalletProvisioner,
        wallet: Address,
        signer: Address,
    ) -> Result<()> {
        let authorized = match state.wallet(wallet) {
            Some(ws) => ws.is_controller(signer),
            None => provisioner.predict_address(signer) == wallet,
        };
        if authorized {
            Ok(())
        } else {
            Err(EngineError::SignerNotAuthorized { signer, wallet })
        }
    }

    /// Every resolved action must still report the identity the user signed.
    /// A registry entry swapped after signing fails here instead of silently
    /// redirecting the intent.
    fn check_action_identities(state: &ChainState, cs: &ChainSequence) -> Result<()> {
        for (index, (declared, id)) in cs
            .sequence
            .actions
            .iter()
            .zip(&cs.sequence.action_ids)
            .enumerate()
        {
            let address = state
                .registry
                .resolve_action(*id)
                .map_err(|_| EngineError::UnresolvedAction(*id))?;
            let action = state
                .action_at(address)
                .ok_or(EngineError::ActionNotDeployed(address))?;
            if !declared.matches(action.protocol_name(), action.action_type()) {
                return Err(EngineError::ActionMismatch {
                    index,
                    declared: declared.to_string(),
                    actual: format!("{}/{}", action.protocol_name(), action.action_type()),
                });
            }
        }
        Ok(())
    }

    /// Post-commit refund settlement. The main sequence has already landed;
    /// any problem here is logged and reported in the receipt, never
    /// propagated as an error.
    fn settle_refund(
        state: &mut ChainState,
        wallet: Address,
        cs: &ChainSequence,
        submitter: Address,
        request: Option<RefundRequest>,
    ) -> RefundOutcome {
        let outcome = Self::try_settle_refund(state, wallet, cs, submitter, request);
        match &outcome {
            RefundOutcome::Settled {
                recipient,
                token,
                amount,
            } => {
                state.emit(EngineEvent::RefundSettled {
                    wallet,
                    recipient: *recipient,
                    token: *token,
                    amount: *amount,
                });
            }
            RefundOutcome::Failed { reason } => {
                warn!(%wallet, reason, "refund settlement failed");
                state.emit(EngineEvent::RefundFailed {
                    wallet,
                    reason: reason.clone(),
                });
            }
        }
        outcome
    }

    fn try_settle_refund(
        state: &mut ChainState,
        wallet: Address,
        cs: &ChainSequence,
        submitter: Address,
        request: Option<RefundRequest>,
    ) -> RefundOutcome {
        let Some(request) = request else {
            return RefundOutcome::Failed {
                reason: "fee action recorded no refund request".to_string(),
            };
        };
        if request.token != cs.refund_token {
            return RefundOutcome::Failed {
                reason: format!(
                    "refund token mismatch: requested {}, bundle allows {}",
                    request.token, cs.refund_token
                ),
            };
        }

        let recipient = match cs.refund_recipient {
            RefundRecipient::Executor => submitter,
            RefundRecipient::FeeRecipient => match state.registry.fee_recipient() {
                Ok(addr) => addr,
                Err(err) => {
                    return RefundOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            },
        };

        let amount = request.amount.min(cs.max_refund_amount);
        match state.ledger.transfer(cs.refund_token, wallet, recipient, amount) {
            Ok(()) => RefundOutcome::Settled {
                recipient,
                token: cs.refund_token,
                amount,
            },
            Err(err) => RefundOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }
}
