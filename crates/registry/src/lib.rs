//! Governed action/pool registry for the sigil execution twin.
//!
//! Models the admin vault of the on-chain system: identifier-to-address
//! mappings behind a two-phase, delay-gated change process, a role hierarchy,
//! a governed fee recipient and the wallet baseline configuration. Time is the
//! modeled chain's timestamp, passed in by the caller, so governance-delay
//! behavior is fully deterministic.

pub mod config;
pub mod error;
pub mod events;
pub mod proposal;
pub mod registry;
pub mod roles;

pub use config::{ConfigSlot, WalletConfig};
pub use error::{RegistryError, Result};
pub use events::{GovernanceCategory, RegistryEvent};
pub use proposal::{GovernedMap, Proposal, Slot};
pub use registry::{ActionRegistry, PoolKey};
pub use roles::{Role, RoleTable};
