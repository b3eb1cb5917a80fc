//! The governed action/pool registry.
//!
//! Every mutation is role-gated and (except for the owner escape hatch)
//! delay-gated. All lookups fail closed: an unresolvable identifier aborts the
//! caller rather than defaulting to any address.

use crate::config::{ConfigSlot, WalletConfig};
use crate::error::{RegistryError, Result};
use crate::events::{GovernanceCategory, RegistryEvent};
use crate::proposal::GovernedMap;
use crate::roles::{Role, RoleTable};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use sigil_types::{ActionId, PoolId};
use std::fmt;
use tracing::{info, warn};

/// Pool registrations are keyed by protocol and pool identifier.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PoolKey {
    pub protocol: String,
    pub pool_id: PoolId,
}

impl PoolKey {
    pub fn new(protocol: impl Into<String>, pool_id: PoolId) -> Self {
        Self {
            protocol: protocol.into(),
            pool_id,
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.protocol, self.pool_id)
    }
}

const FEE_RECIPIENT_KEY: &str = "fee_recipient";

/// Governed mapping from opaque identifiers to trusted contract addresses,
/// plus the fee recipient and the wallet baseline configuration.
#[derive(Clone, Debug)]
pub struct ActionRegistry {
    /// Seconds that must elapse between propose and execute.
    delay: u64,
    roles: RoleTable,
    actions: GovernedMap<ActionId>,
    pools: GovernedMap<PoolKey>,
    fee_recipient: GovernedMap<String>,
    wallet_config: ConfigSlot,
    events: Vec<RegistryEvent>,
}

impl ActionRegistry {
    pub fn new(owner: Address, delay: u64) -> Self {
        Self {
            delay,
            roles: RoleTable::new(owner),
            actions: GovernedMap::new(),
            pools: GovernedMap::new(),
            fee_recipient: GovernedMap::new(),
            wallet_config: ConfigSlot::default(),
            events: Vec::new(),
        }
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    // ===== Roles =====

    pub fn grant_role(&mut self, caller: Address, role: Role, account: Address) -> Result<()> {
        self.roles.grant(caller, role, account)?;
        self.events.push(RegistryEvent::RoleGranted { role, account });
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: Address, role: Role, account: Address) -> Result<()> {
        self.roles.revoke(caller, role, account)?;
        self.events.push(RegistryEvent::RoleRevoked { role, account });
        Ok(())
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.roles.has_role(role, account)
    }

    // ===== Actions =====

    /// Record an action proposal. A pending proposal for the same identifier
    /// is overwritten and its delay clock restarts.
    pub fn propose_action(
        &mut self,
        caller: Address,
        id: ActionId,
        address: Address,
        now: u64,
    ) -> Result<()> {
        self.roles.require(Role::ActionProposer, caller)?;
        let replaced = self.actions.propose(id, address, now)?;
        self.emit_proposed(GovernanceCategory::Action, id.to_string(), address, now, replaced);
        Ok(())
    }

    /// Promote a proposed action once the delay has elapsed. The address must
    /// match the proposed one. Owners may bypass the delay; the bypass is
    /// recorded on the event, never silent.
    pub fn execute_action(
        &mut self,
        caller: Address,
        id: ActionId,
        address: Address,
        now: u64,
    ) -> Result<()> {
        self.roles.require(Role::ActionExecutor, caller)?;
        let bypass = self.roles.has_role(Role::Owner, caller);
        let done = self.actions.execute(&id, address, now, self.delay, bypass)?;
        self.emit_executed(GovernanceCategory::Action, id.to_string(), done.address, done.delay_bypassed);
        Ok(())
    }

    pub fn cancel_action(&mut self, caller: Address, id: ActionId) -> Result<()> {
        self.roles.require(Role::ActionCanceler, caller)?;
        self.actions.cancel(&id)?;
        self.events.push(RegistryEvent::Cancelled {
            category: GovernanceCategory::Action,
            key: id.to_string(),
        });
        Ok(())
    }

    pub fn remove_action(&mut self, caller: Address, id: ActionId) -> Result<()> {
        self.roles.require(Role::ActionDisposer, caller)?;
        let address = self.actions.remove(&id)?;
        self.events.push(RegistryEvent::Removed {
            category: GovernanceCategory::Action,
            key: id.to_string(),
            address,
        });
        Ok(())
    }

    /// Pure lookup used by the executor and the verifier. Fails closed.
    pub fn resolve_action(&self, id: ActionId) -> Result<Address> {
        self.actions
            .resolve(&id)
            .ok_or(RegistryError::UnknownAction(id))
    }

    // ===== Pools =====

    pub fn propose_pool(
        &mut self,
        caller: Address,
        key: PoolKey,
        address: Address,
        now: u64,
    ) -> Result<()> {
        self.roles.require(Role::PoolProposer, caller)?;
        let label = key.to_string();
        let replaced = self.pools.propose(key, address, now)?;
        self.emit_proposed(GovernanceCategory::Pool, label, address, now, replaced);
        Ok(())
    }

    pub fn execute_pool(
        &mut self,
        caller: Address,
        key: &PoolKey,
        address: Address,
        now: u64,
    ) -> Result<()> {
        self.roles.require(Role::PoolExecutor, caller)?;
        let bypass = self.roles.has_role(Role::Owner, caller);
        let done = self.pools.execute(key, address, now, self.delay, bypass)?;
        self.emit_executed(GovernanceCategory::Pool, key.to_string(), done.address, done.delay_bypassed);
        Ok(())
    }

    pub fn cancel_pool(&mut self, caller: Address, key: &PoolKey) -> Result<()> {
        self.roles.require(Role::PoolCanceler, caller)?;
        self.pools.cancel(key)?;
        self.events.push(RegistryEvent::Cancelled {
            category: GovernanceCategory::Pool,
            key: key.to_string(),
        });
        Ok(())
    }

    pub fn remove_pool(&mut self, caller: Address, key: &PoolKey) -> Result<()> {
        self.roles.require(Role::PoolDisposer, caller)?;
        let address = self.pools.remove(key)?;
        self.events.push(RegistryEvent::Removed {
            category: GovernanceCategory::Pool,
            key: key.to_string(),
            address,
        });
        Ok(())
    }

    pub fn resolve_pool(&self, key: &PoolKey) -> Result<Address> {
        self.pools
            .resolve(key)
            .ok_or_else(|| RegistryError::UnknownPool {
                protocol: key.protocol.clone(),
                pool_id: key.pool_id,
            })
    }

    // ===== Fee recipient =====

    pub fn propose_fee_recipient(
        &mut self,
        caller: Address,
        recipient: Address,
        now: u64,
    ) -> Result<()> {
        self.roles.require(Role::FeeProposer, caller)?;
        let replaced = self
            .fee_recipient
            .propose(FEE_RECIPIENT_KEY.to_string(), recipient, now)?;
        self.emit_proposed(
            GovernanceCategory::Fee,
            FEE_RECIPIENT_KEY.to_string(),
            recipient,
            now,
            replaced,
        );
        Ok(())
    }

    pub fn execute_fee_recipient(
        &mut self,
        caller: Address,
        recipient: Address,
        now: u64,
    ) -> Result<()> {
        self.roles.require(Role::FeeExecutor, caller)?;
        let bypass = self.roles.has_role(Role::Owner, caller);
        let done = self.fee_recipient.execute(
            &FEE_RECIPIENT_KEY.to_string(),
            recipient,
            now,
            self.delay,
            bypass,
        )?;
        self.emit_executed(
            GovernanceCategory::Fee,
            FEE_RECIPIENT_KEY.to_string(),
            done.address,
            done.delay_bypassed,
        );
        Ok(())
    }

    /// The governed refund destination. Fails closed when unset.
    pub fn fee_recipient(&self) -> Result<Address> {
        self.fee_recipient
            .resolve(&FEE_RECIPIENT_KEY.to_string())
            .ok_or(RegistryError::NoFeeRecipient)
    }

    // ===== Wallet configuration =====

    pub fn propose_wallet_config(&mut self, caller: Address, config: WalletConfig) -> Result<()> {
        self.roles.require(Role::ConfigProposer, caller)?;
        self.events.push(RegistryEvent::ConfigProposed {
            config: serde_json::to_value(&config).unwrap_or_default(),
        });
        self.wallet_config.propose(config);
        Ok(())
    }

    pub fn approve_wallet_config(&mut self, caller: Address) -> Result<()> {
        self.roles.require(Role::ConfigApprover, caller)?;
        let applied = self.wallet_config.approve()?;
        let payload = serde_json::to_value(applied).unwrap_or_default();
        self.events.push(RegistryEvent::ConfigApproved { config: payload });
        Ok(())
    }

    pub fn wallet_config(&self) -> &WalletConfig {
        self.wallet_config.current()
    }

    // ===== Events =====

    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit_proposed(
        &mut self,
        category: GovernanceCategory,
        key: String,
        address: Address,
        proposed_at: u64,
        replaced_pending: bool,
    ) {
        info!(?category, %key, %address, replaced_pending, "registration proposed");
        self.events.push(RegistryEvent::Proposed {
            category,
            key,
            address,
            proposed_at,
            replaced_pending,
        });
    }

    fn emit_executed(
        &mut self,
        category: GovernanceCategory,
        key: String,
        address: Address,
        delay_bypassed: bool,
    ) {
        if delay_bypassed {
            warn!(?category, %key, %address, "governance delay bypassed by owner");
        }
        self.events.push(RegistryEvent::Executed {
            category,
            key,
            address,
            delay_bypassed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: u64 = 86_400;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    /// Registry with one account per operational role.
    fn setup() -> (ActionRegistry, Address) {
        let owner = addr(1);
        let mut reg = ActionRegistry::new(owner, DELAY);
        for role in [
            Role::ActionProposer,
            Role::ActionExecutor,
            Role::ActionCanceler,
            Role::ActionDisposer,
            Role::PoolProposer,
            Role::PoolExecutor,
            Role::FeeProposer,
            Role::FeeExecutor,
        ] {
            reg.grant_role(owner, role, addr(2)).unwrap();
        }
        (reg, owner)
    }

    #[test]
    fn action_lifecycle_with_delay() {
        let (mut reg, _) = setup();
        let ops = addr(2);
        let id = ActionId::from_name("AaveV3Supply");
        let target = addr(0xaa);

        reg.propose_action(ops, id, target, 0).unwrap();
        assert!(matches!(
            reg.resolve_action(id),
            Err(RegistryError::UnknownAction(_))
        ));

        // Too early.
        assert!(matches!(
            reg.execute_action(ops, id, target, DELAY - 1),
            Err(RegistryError::DelayNotElapsed { .. })
        ));
        // Exactly at the boundary.
        reg.execute_action(ops, id, target, DELAY).unwrap();
        assert_eq!(reg.resolve_action(id).unwrap(), target);

        reg.remove_action(ops, id).unwrap();
        assert!(reg.resolve_action(id).is_err());
    }

    #[test]
    fn unauthorized_callers_are_rejected() {
        let (mut reg, _) = setup();
        let stranger = addr(9);
        let id = ActionId::from_name("X");

        assert!(matches!(
            reg.propose_action(stranger, id, addr(3), 0),
            Err(RegistryError::RoleUnauthorized { .. })
        ));
        assert!(reg.cancel_action(stranger, id).is_err());
        assert!(reg.remove_action(stranger, id).is_err());
    }

    #[test]
    fn owner_bypasses_delay_and_it_is_recorded() {
        let (mut reg, owner) = setup();
        let id = ActionId::from_name("Emergency");

        reg.propose_action(owner, id, addr(3), 100).unwrap();
        reg.execute_action(owner, id, addr(3), 101).unwrap();
        assert_eq!(reg.resolve_action(id).unwrap(), addr(3));

        assert!(reg.events().iter().any(|e| matches!(
            e,
            RegistryEvent::Executed {
                delay_bypassed: true,
                ..
            }
        )));
    }

    #[test]
    fn pool_lifecycle() {
        let (mut reg, _) = setup();
        let ops = addr(2);
        let pool_addr = addr(0xcc);
        let key = PoolKey::new("AaveV3", PoolId::from_address(pool_addr));

        reg.propose_pool(ops, key.clone(), pool_addr, 0).unwrap();
        reg.execute_pool(ops, &key, pool_addr, DELAY).unwrap();
        assert_eq!(reg.resolve_pool(&key).unwrap(), pool_addr);

        let missing = PoolKey::new("MorphoBlue", PoolId::new([9, 9, 9, 9]));
        assert!(matches!(
            reg.resolve_pool(&missing),
            Err(RegistryError::UnknownPool { .. })
        ));
    }

    #[test]
    fn fee_recipient_is_governed() {
        let (mut reg, _) = setup();
        let ops = addr(2);

        assert!(matches!(
            reg.fee_recipient(),
            Err(RegistryError::NoFeeRecipient)
        ));

        reg.propose_fee_recipient(ops, addr(0xfe), 0).unwrap();
        reg.execute_fee_recipient(ops, addr(0xfe), DELAY).unwrap();
        assert_eq!(reg.fee_recipient().unwrap(), addr(0xfe));
    }

    #[test]
    fn wallet_config_needs_two_roles() {
        let owner = addr(1);
        let proposer = addr(5);
        let approver = addr(6);
        let mut reg = ActionRegistry::new(owner, DELAY);
        reg.grant_role(owner, Role::ConfigProposer, proposer).unwrap();
        reg.grant_role(owner, Role::ConfigApprover, approver).unwrap();

        let cfg = WalletConfig {
            modules: vec![addr(0x10)],
            guard: addr(0x11),
            fallback_handler: addr(0x12),
        };

        reg.propose_wallet_config(proposer, cfg.clone()).unwrap();
        assert_ne!(reg.wallet_config(), &cfg, "not applied before approval");

        assert!(reg.approve_wallet_config(proposer).is_err());
        reg.approve_wallet_config(approver).unwrap();
        assert_eq!(reg.wallet_config(), &cfg);
    }

    #[test]
    fn events_cover_the_lifecycle() {
        let (mut reg, _) = setup();
        let ops = addr(2);
        let id = ActionId::from_name("Evented");

        reg.propose_action(ops, id, addr(3), 0).unwrap();
        reg.cancel_action(ops, id).unwrap();

        let events = reg.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, RegistryEvent::Proposed { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, RegistryEvent::Cancelled { .. })));
        assert!(reg.events().is_empty(), "take_events drains");
    }
}
