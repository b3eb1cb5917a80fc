//! EIP-712 typed-data hashing for bundles.
//!
//! The signing domain is deliberately chain-independent: it always binds
//! [`SIGNING_CHAIN_ID`] (chain 1) and the target wallet as the verifying
//! contract, *never* the chain actually executing. This is what lets a single
//! signature serve every chain named in the bundle, including chains where the
//! wallet does not exist yet. Do not "fix" this to use the executing chain id;
//! doing so breaks multi-chain bundles.

use crate::bundle::{Bundle, ChainSequence, Sequence};
use alloy_primitives::{Address, FixedBytes, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct};
use std::borrow::Cow;

/// Constant chain id the domain binds, regardless of executing chain.
pub const SIGNING_CHAIN_ID: u64 = 1;
/// EIP-712 domain name.
pub const DOMAIN_NAME: &str = "SigilBundle";
/// EIP-712 domain version.
pub const DOMAIN_VERSION: &str = "1";

mod wire {
    use alloy_sol_types::sol;

    sol! {
        struct ActionDefinition {
            string protocolName;
            uint8 actionType;
        }

        struct Sequence {
            string name;
            ActionDefinition[] actions;
            bytes4[] actionIds;
            bytes[] callData;
        }

        struct ChainSequence {
            uint256 chainId;
            uint256 sequenceNonce;
            bool deployWallet;
            bool enableGasRefund;
            address refundToken;
            uint256 maxRefundAmount;
            uint8 refundRecipient;
            Sequence sequence;
        }

        struct Bundle {
            uint256 expiry;
            ChainSequence[] sequences;
        }
    }
}

/// The fixed signing domain for a given wallet.
pub fn signing_domain(wallet: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(DOMAIN_NAME)),
        Some(Cow::Borrowed(DOMAIN_VERSION)),
        Some(U256::from(SIGNING_CHAIN_ID)),
        Some(wallet),
        None,
    )
}

/// Canonical digest a wallet owner signs for a bundle.
pub fn bundle_signing_hash(bundle: &Bundle, wallet: Address) -> B256 {
    to_wire(bundle).eip712_signing_hash(&signing_domain(wallet))
}

fn to_wire(bundle: &Bundle) -> wire::Bundle {
    wire::Bundle {
        expiry: U256::from(bundle.expiry),
        sequences: bundle.sequences.iter().map(chain_sequence_to_wire).collect(),
    }
}

fn chain_sequence_to_wire(cs: &ChainSequence) -> wire::ChainSequence {
    wire::ChainSequence {
        chainId: U256::from(cs.chain_id),
        sequenceNonce: U256::from(cs.sequence_nonce),
        deployWallet: cs.deploy_wallet,
        enableGasRefund: cs.enable_gas_refund,
        refundToken: cs.refund_token,
        maxRefundAmount: cs.max_refund_amount,
        refundRecipient: cs.refund_recipient.as_u8(),
        sequence: sequence_to_wire(&cs.sequence),
    }
}

fn sequence_to_wire(seq: &Sequence) -> wire::Sequence {
    wire::Sequence {
        name: seq.name.clone(),
        actions: seq
            .actions
            .iter()
            .map(|a| wire::ActionDefinition {
                protocolName: a.protocol_name.clone(),
                actionType: a.action_type.as_u8(),
            })
            .collect(),
        actionIds: seq
            .action_ids
            .iter()
            .map(|id| FixedBytes::from(id.0))
            .collect(),
        callData: seq.call_data.iter().map(|b| b.to_vec().into()).collect(),
    }
}
