//! Two-phase, delay-gated registration slots.
//!
//! Each identifier is an explicit state machine rather than a pair of loose
//! mappings: a slot may hold a live address, a pending proposal, or both (a
//! replacement proposed while the previous registration is still live).
//! `execute` requires the submitted address to match the proposed one, which
//! makes front-running substitution a guard violation instead of a silent
//! redirect.

use crate::error::{RegistryError, Result};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// A pending registration awaiting its delay.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub address: Address,
    pub proposed_at: u64,
}

/// One identifier's registration state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Slot {
    pub live: Option<Address>,
    pub pending: Option<Proposal>,
}

/// Outcome of a successful `execute`, reported for event emission.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Executed {
    pub address: Address,
    /// Whether the caller used the owner's delay bypass.
    pub delay_bypassed: bool,
}

/// Delay-gated map from identifiers to trusted addresses.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GovernedMap<K>
where
    K: Eq + Hash,
{
    slots: HashMap<K, Slot>,
}

impl<K> GovernedMap<K>
where
    K: Eq + Hash + Clone + ToString,
{
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Record a proposal. Re-proposing an identifier with a pending proposal
    /// overwrites it and restarts the delay clock; the previous pending entry
    /// becomes inert. Returns whether a pending proposal was replaced.
    pub fn propose(&mut self, key: K, address: Address, now: u64) -> Result<bool> {
        if address.is_zero() {
            return Err(RegistryError::ZeroAddress(key.to_string()));
        }
        let slot = self.slots.entry(key).or_default();
        let replaced = slot.pending.is_some();
        slot.pending = Some(Proposal {
            address,
            proposed_at: now,
        });
        Ok(replaced)
    }

    /// Promote a pending proposal to live. Fails unless a proposal exists,
    /// the submitted address matches the proposed one, and the delay has
    /// elapsed (inclusive) — unless `bypass_delay` is set, which skips only
    /// the delay check.
    pub fn execute(
        &mut self,
        key: &K,
        address: Address,
        now: u64,
        delay: u64,
        bypass_delay: bool,
    ) -> Result<Executed> {
        let slot = self
            .slots
            .get_mut(key)
            .ok_or_else(|| RegistryError::NoPendingProposal(key.to_string()))?;
        let proposal = slot
            .pending
            .ok_or_else(|| RegistryError::NoPendingProposal(key.to_string()))?;

        if proposal.address != address {
            return Err(RegistryError::AddressMismatch {
                key: key.to_string(),
                proposed: proposal.address,
                submitted: address,
            });
        }

        let ready_at = proposal.proposed_at.saturating_add(delay);
        if !bypass_delay && now < ready_at {
            return Err(RegistryError::DelayNotElapsed {
                key: key.to_string(),
                ready_at,
                now,
            });
        }

        slot.live = Some(address);
        slot.pending = None;
        Ok(Executed {
            address,
            delay_bypassed: bypass_delay && now < ready_at,
        })
    }

    /// Drop a pending proposal without effect on the live entry.
    pub fn cancel(&mut self, key: &K) -> Result<()> {
        let slot = self
            .slots
            .get_mut(key)
            .filter(|s| s.pending.is_some())
            .ok_or_else(|| RegistryError::NoPendingProposal(key.to_string()))?;
        slot.pending = None;
        Ok(())
    }

    /// Delete a live entry, immediately invalidating anything that resolves
    /// through it. A pending proposal on the same identifier survives.
    pub fn remove(&mut self, key: &K) -> Result<Address> {
        self.slots
            .get_mut(key)
            .and_then(|s| s.live.take())
            .ok_or_else(|| RegistryError::NothingToRemove(key.to_string()))
    }

    /// Pure lookup of the live address.
    pub fn resolve(&self, key: &K) -> Option<Address> {
        self.slots.get(key).and_then(|s| s.live)
    }

    /// The pending proposal for an identifier, if any.
    pub fn pending(&self, key: &K) -> Option<Proposal> {
        self.slots.get(key).and_then(|s| s.pending)
    }
}
