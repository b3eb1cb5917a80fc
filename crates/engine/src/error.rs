use alloy_primitives::{Address, U256};
use sigil_registry::RegistryError;
use sigil_types::{ActionId, TypesError};
use thiserror::Error;

/// Failures raised by an individual action. The executor propagates the
/// rendered reason unmodified and aborts the whole sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("calldata decode failed: {0}")]
    Decode(String),

    #[error("insufficient balance of {token}: need {needed}, have {available}")]
    InsufficientBalance {
        token: Address,
        needed: U256,
        available: U256,
    },

    #[error("balance overflow for {0}")]
    BalanceOverflow(Address),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("bundle context required but not provided")]
    MissingBundleContext,

    #[error("{0}")]
    Other(String),
}

/// Verification and execution failures. Every variant except the refund path
/// aborts the enclosing transaction with no state change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("bundle expired at {expiry}, chain time is {now}")]
    Expired { expiry: u64, now: u64 },

    #[error("recovered signer {signer} is not a controller of wallet {wallet}")]
    SignerNotAuthorized { signer: Address, wallet: Address },

    #[error("no sequence in bundle for chain {chain_id} at nonce {expected_nonce}")]
    NoMatchingSequence { chain_id: u64, expected_nonce: u64 },

    #[error("action {index} mismatch: signed intent {declared}, registered action {actual}")]
    ActionMismatch {
        index: usize,
        declared: String,
        actual: String,
    },

    #[error("gas refund enabled but the sequence has no fee action")]
    FeeActionRequired,

    #[error("fee action present but gas refund is disabled")]
    FeeActionForbidden,

    #[error("action id {0} is not registered")]
    UnresolvedAction(ActionId),

    #[error("no action deployed at {0}")]
    ActionNotDeployed(Address),

    #[error("action {index} ({name}) failed: {reason}")]
    ActionExecutionFailure {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("wallet {0} does not exist and the deploy flag is not set")]
    WalletNotProvisioned(Address),

    #[error("wallet for owner {owner} already provisioned at {wallet}")]
    AlreadyProvisioned { owner: Address, wallet: Address },

    #[error("caller {caller} may not execute sequences for wallet {wallet}")]
    UnauthorizedExecutorCall { caller: Address, wallet: Address },

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
