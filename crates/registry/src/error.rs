use crate::roles::Role;
use alloy_primitives::Address;
use sigil_types::{ActionId, PoolId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("account {account} does not hold role {role:?}")]
    RoleUnauthorized { role: Role, account: Address },

    #[error("no pending proposal for {0}")]
    NoPendingProposal(String),

    #[error("proposed address mismatch for {key}: proposed {proposed}, submitted {submitted}")]
    AddressMismatch {
        key: String,
        proposed: Address,
        submitted: Address,
    },

    #[error("governance delay not elapsed for {key}: ready at {ready_at}, now {now}")]
    DelayNotElapsed {
        key: String,
        ready_at: u64,
        now: u64,
    },

    #[error("action {0} is not registered")]
    UnknownAction(ActionId),

    #[error("pool {protocol}:{pool_id} is not registered")]
    UnknownPool { protocol: String, pool_id: PoolId },

    #[error("nothing registered under {0}")]
    NothingToRemove(String),

    #[error("zero address not allowed for {0}")]
    ZeroAddress(String),

    #[error("no pending wallet configuration")]
    NoPendingConfig,

    #[error("no fee recipient configured")]
    NoFeeRecipient,
}

pub type Result<T> = std::result::Result<T, RegistryError>;
