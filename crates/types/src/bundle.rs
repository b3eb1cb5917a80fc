//! Bundle, chain-sequence and sequence containers.

use crate::action::{ActionDefinition, ActionType};
use crate::error::TypesError;
use crate::ident::ActionId;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// One atomic unit of work on one chain: an ordered list of actions, the
/// identifiers they resolve through, and their per-action calldata.
///
/// Invariant: `actions`, `action_ids` and `call_data` are positionally paired
/// and must have equal length.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Sequence {
    /// Human-readable label, covered by the signature.
    pub name: String,
    /// Signed declarations of what each action is expected to be.
    pub actions: Vec<ActionDefinition>,
    /// Registry identifiers resolved at execution time.
    pub action_ids: Vec<ActionId>,
    /// Per-action calldata, opaque to the executor.
    pub call_data: Vec<Bytes>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.action_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_ids.is_empty()
    }

    /// Enforce the positional-pairing invariant.
    pub fn check_lengths(&self) -> Result<(), TypesError> {
        if self.actions.len() != self.action_ids.len()
            || self.action_ids.len() != self.call_data.len()
        {
            return Err(TypesError::LengthMismatch {
                actions: self.actions.len(),
                ids: self.action_ids.len(),
                calls: self.call_data.len(),
            });
        }
        Ok(())
    }

    /// Whether any signed declaration carries the fee sentinel.
    pub fn has_fee_action(&self) -> bool {
        self.actions
            .iter()
            .any(|a| a.action_type == ActionType::Fee)
    }
}

/// Who receives a gas refund.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum RefundRecipient {
    /// The account that submitted the transaction.
    Executor = 0,
    /// The governed fee-recipient address from the registry.
    FeeRecipient = 1,
}

impl RefundRecipient {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for RefundRecipient {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Executor),
            1 => Ok(Self::FeeRecipient),
            other => Err(TypesError::UnknownRefundRecipient(other)),
        }
    }
}

/// A sequence bound to a specific chain and a specific expected nonce.
///
/// Invariant: if `enable_gas_refund` is set the embedded sequence must contain
/// at least one [`ActionType::Fee`] action; if unset it must contain none.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ChainSequence {
    /// Chain this entry executes on.
    pub chain_id: u64,
    /// Expected per-wallet nonce at execution time.
    pub sequence_nonce: u64,
    /// Provision the wallet at its deterministic address if it does not exist.
    pub deploy_wallet: bool,
    /// Whether the submitter is reimbursed from the wallet.
    pub enable_gas_refund: bool,
    /// Token the refund is paid in.
    pub refund_token: Address,
    /// Upper bound on the refund, regardless of what the fee action requests.
    pub max_refund_amount: U256,
    /// Who receives the refund.
    pub refund_recipient: RefundRecipient,
    /// The work itself.
    pub sequence: Sequence,
}

impl ChainSequence {
    /// Check the refund-flag/fee-action consistency invariant. Returns
    /// `Ok(true)` when a refund must be settled after execution.
    pub fn check_refund_gating(&self) -> Result<bool, RefundGatingError> {
        match (self.enable_gas_refund, self.sequence.has_fee_action()) {
            (true, false) => Err(RefundGatingError::FeeActionRequired),
            (false, true) => Err(RefundGatingError::FeeActionForbidden),
            (enabled, _) => Ok(enabled),
        }
    }
}

/// Refund-gating violations, surfaced before any action executes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RefundGatingError {
    /// Refund enabled but no fee action present.
    FeeActionRequired,
    /// Fee action present but refund disabled.
    FeeActionForbidden,
}

/// A signed, multi-chain container of chain sequences with a single expiry.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bundle {
    /// Unix timestamp after which no chain may execute any entry.
    pub expiry: u64,
    /// One entry per target chain. Duplicates are tolerated; selection takes
    /// the first match.
    pub sequences: Vec<ChainSequence>,
}

impl Bundle {
    /// Select the first entry matching the executing chain and the wallet's
    /// expected nonce. This single check enforces both chain-correctness and
    /// strict nonce ordering.
    pub fn sequence_for(&self, chain_id: u64, expected_nonce: u64) -> Option<&ChainSequence> {
        self.sequences
            .iter()
            .find(|cs| cs.chain_id == chain_id && cs.sequence_nonce == expected_nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn seq(actions: Vec<ActionDefinition>) -> Sequence {
        let n = actions.len();
        Sequence {
            name: "test".to_string(),
            action_ids: (0..n as u8).map(|i| ActionId::new([i, 0, 0, 0])).collect(),
            call_data: vec![Bytes::new(); n],
            actions,
        }
    }

    fn chain_seq(chain_id: u64, nonce: u64, sequence: Sequence) -> ChainSequence {
        ChainSequence {
            chain_id,
            sequence_nonce: nonce,
            deploy_wallet: false,
            enable_gas_refund: false,
            refund_token: Address::ZERO,
            max_refund_amount: U256::ZERO,
            refund_recipient: RefundRecipient::Executor,
            sequence,
        }
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut s = seq(vec![ActionDefinition::new("AaveV3", ActionType::Deposit)]);
        assert!(s.check_lengths().is_ok());

        s.call_data.push(Bytes::new());
        assert_eq!(
            s.check_lengths(),
            Err(TypesError::LengthMismatch {
                actions: 1,
                ids: 1,
                calls: 2
            })
        );
    }

    #[test]
    fn selection_takes_first_match() {
        let bundle = Bundle {
            expiry: 100,
            sequences: vec![
                chain_seq(1, 0, seq(vec![])),
                chain_seq(137, 0, seq(vec![])),
                chain_seq(1, 0, seq(vec![ActionDefinition::new("X", ActionType::Custom)])),
            ],
        };

        let selected = bundle.sequence_for(1, 0).unwrap();
        assert!(selected.sequence.is_empty(), "first match wins");

        assert!(bundle.sequence_for(1, 1).is_none());
        assert!(bundle.sequence_for(10, 0).is_none());
        assert_eq!(bundle.sequence_for(137, 0).unwrap().chain_id, 137);
    }

    #[test]
    fn refund_gating_both_directions() {
        let fee_seq = seq(vec![ActionDefinition::new("GasRefund", ActionType::Fee)]);
        let plain_seq = seq(vec![ActionDefinition::new("AaveV3", ActionType::Deposit)]);

        let mut cs = chain_seq(1, 0, fee_seq.clone());
        cs.enable_gas_refund = true;
        assert_eq!(cs.check_refund_gating(), Ok(true));

        cs.sequence = plain_seq.clone();
        assert_eq!(
            cs.check_refund_gating(),
            Err(RefundGatingError::FeeActionRequired)
        );

        cs.enable_gas_refund = false;
        cs.sequence = fee_seq;
        assert_eq!(
            cs.check_refund_gating(),
            Err(RefundGatingError::FeeActionForbidden)
        );

        cs.sequence = plain_seq;
        assert_eq!(cs.check_refund_gating(), Ok(false));
    }
}
