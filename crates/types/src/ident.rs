//! Opaque identifiers for registered actions and pools.

use alloy_primitives::{keccak256, Address};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 4-byte action identifier, the first four bytes of the keccak256 hash of the
/// action's canonical name (selector-style).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub [u8; 4]);

impl ActionId {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Derive the identifier from an action's canonical name.
    pub fn from_name(name: &str) -> Self {
        let hash = keccak256(name.as_bytes());
        Self([hash[0], hash[1], hash[2], hash[3]])
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionId(0x{})", hex::encode(self.0))
    }
}

/// 4-byte pool identifier, derived from the pool's on-chain address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolId(pub [u8; 4]);

impl PoolId {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Derive the identifier from the pool's address.
    pub fn from_address(address: Address) -> Self {
        let hash = keccak256(address.as_slice());
        Self([hash[0], hash[1], hash[2], hash[3]])
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId(0x{})", hex::encode(self.0))
    }
}
