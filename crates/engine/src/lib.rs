//! Deterministic execution engine for signed multi-chain bundles.
//!
//! One [`ChainState`] models one chain: its governed registry, token
//! balances, provisioned wallets, deployed actions and per-wallet nonces.
//! [`BundleVerifier::execute_bundle`] is the entry point a relayer companion
//! uses to replay a signed bundle against that state and predict the exact
//! on-chain outcome, including the failure taxonomy, before paying for gas.
//!
//! The engine is synchronous on purpose. The modeled substrate executes each
//! submission as one atomic, totally ordered transaction, so the twin gets the
//! same shape: every entry point runs to completion or rolls back wholesale
//! via [`ChainState::transact`].

pub mod action;
pub mod actions;
pub mod chain;
pub mod error;
pub mod events;
pub mod executor;
pub mod ledger;
pub mod provisioner;
pub mod verifier;
pub mod wallet;

pub use action::{Action, ActionContext, ActionKind, BundleContext, RefundRequest, WalletHandle};
pub use chain::ChainState;
pub use error::{ActionError, EngineError, Result};
pub use events::EngineEvent;
pub use executor::SequenceExecutor;
pub use ledger::TokenLedger;
pub use provisioner::WalletProvisioner;
pub use verifier::{BundleVerifier, ExecutionReceipt, RefundOutcome};
pub use wallet::WalletState;
