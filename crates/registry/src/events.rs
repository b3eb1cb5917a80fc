//! Append-only audit events for governance transitions.

use crate::roles::Role;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Which governed surface a lifecycle event belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GovernanceCategory {
    Action,
    Pool,
    Fee,
    Config,
}

/// Structured governance events. Not consumed by the core logic; emitted for
/// external observability and re-broadcast by the runtime.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum RegistryEvent {
    Proposed {
        category: GovernanceCategory,
        key: String,
        address: Address,
        proposed_at: u64,
        /// True when this proposal overwrote a still-pending one.
        replaced_pending: bool,
    },
    Executed {
        category: GovernanceCategory,
        key: String,
        address: Address,
        /// True when the owner escape hatch skipped the delay.
        delay_bypassed: bool,
    },
    Cancelled {
        category: GovernanceCategory,
        key: String,
    },
    Removed {
        category: GovernanceCategory,
        key: String,
        address: Address,
    },
    RoleGranted {
        role: Role,
        account: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
    },
    ConfigProposed {
        config: serde_json::Value,
    },
    ConfigApproved {
        config: serde_json::Value,
    },
}
