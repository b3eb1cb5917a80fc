//! Core data model for signed multi-chain execution bundles.
//!
//! A [`Bundle`] is signed once by the wallet owner and can be replayed on every
//! chain it names. The types here are transient: they are constructed by a
//! client, hashed and verified by the engine, and never persisted beyond the
//! per-wallet nonce increment.

pub mod action;
pub mod bundle;
pub mod error;
pub mod ident;
pub mod signature;
pub mod typed_data;

pub use action::{ActionDefinition, ActionType};
pub use bundle::{Bundle, ChainSequence, RefundGatingError, RefundRecipient, Sequence};
pub use error::{Result, TypesError};
pub use ident::{ActionId, PoolId};
pub use signature::recover_signer;
pub use typed_data::{
    bundle_signing_hash, signing_domain, DOMAIN_NAME, DOMAIN_VERSION, SIGNING_CHAIN_ID,
};
