//! Role-based access control for registry governance.

use crate::error::{RegistryError, Result};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Governance roles. Each mutation category (actions, pools, fees, wallet
/// config) has its own proposer/executor/canceler/disposer split so that
/// compromise of one key never grants the full lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Role {
    /// Root authority. Administers `Admin` and may bypass the governance
    /// delay for emergency response.
    Owner,
    /// Administers all operational roles below.
    Admin,
    ActionProposer,
    ActionExecutor,
    ActionCanceler,
    ActionDisposer,
    PoolProposer,
    PoolExecutor,
    PoolCanceler,
    PoolDisposer,
    FeeProposer,
    FeeExecutor,
    ConfigProposer,
    ConfigApprover,
}

impl Role {
    /// The role that may grant or revoke this role.
    pub fn admin_role(self) -> Role {
        match self {
            Role::Owner | Role::Admin => Role::Owner,
            _ => Role::Admin,
        }
    }
}

/// Role membership table. The owner set is never empty: it is seeded at
/// construction and `Owner` implicitly satisfies every role check, which is
/// the documented emergency escape hatch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleTable {
    members: HashMap<Role, HashSet<Address>>,
}

impl RoleTable {
    pub fn new(owner: Address) -> Self {
        let mut members: HashMap<Role, HashSet<Address>> = HashMap::new();
        members.entry(Role::Owner).or_default().insert(owner);
        Self { members }
    }

    /// Whether `account` holds `role`, directly or through `Owner`.
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        let holds = |r: Role| {
            self.members
                .get(&r)
                .is_some_and(|set| set.contains(&account))
        };
        holds(role) || (role != Role::Owner && holds(Role::Owner))
    }

    /// Fail closed if `account` does not hold `role`.
    pub fn require(&self, role: Role, account: Address) -> Result<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(RegistryError::RoleUnauthorized { role, account })
        }
    }

    /// Grant `role` to `account`. The caller must hold the role's admin role.
    pub fn grant(&mut self, caller: Address, role: Role, account: Address) -> Result<()> {
        self.require(role.admin_role(), caller)?;
        if account.is_zero() {
            return Err(RegistryError::ZeroAddress(format!("{role:?} grant")));
        }
        self.members.entry(role).or_default().insert(account);
        info!(?role, %account, "role granted");
        Ok(())
    }

    /// Revoke `role` from `account`. The caller must hold the role's admin role.
    pub fn revoke(&mut self, caller: Address, role: Role, account: Address) -> Result<()> {
        self.require(role.admin_role(), caller)?;
        if let Some(set) = self.members.get_mut(&role) {
            set.remove(&account);
        }
        info!(?role, %account, "role revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    #[test]
    fn owner_satisfies_every_role() {
        let table = RoleTable::new(addr(1));
        assert!(table.has_role(Role::Owner, addr(1)));
        assert!(table.has_role(Role::ActionProposer, addr(1)));
        assert!(table.has_role(Role::ConfigApprover, addr(1)));
        assert!(!table.has_role(Role::ActionProposer, addr(2)));
    }

    #[test]
    fn grants_follow_the_hierarchy() {
        let owner = addr(1);
        let admin = addr(2);
        let proposer = addr(3);
        let mut table = RoleTable::new(owner);

        // A non-admin cannot hand out operational roles.
        assert!(matches!(
            table.grant(admin, Role::ActionProposer, proposer),
            Err(RegistryError::RoleUnauthorized { .. })
        ));

        table.grant(owner, Role::Admin, admin).unwrap();
        table.grant(admin, Role::ActionProposer, proposer).unwrap();
        assert!(table.has_role(Role::ActionProposer, proposer));

        // Admin cannot mint more owners.
        assert!(table.grant(admin, Role::Owner, admin).is_err());

        table.revoke(admin, Role::ActionProposer, proposer).unwrap();
        assert!(!table.has_role(Role::ActionProposer, proposer));
    }

    #[test]
    fn zero_address_grants_are_rejected() {
        let mut table = RoleTable::new(addr(1));
        assert!(matches!(
            table.grant(addr(1), Role::Admin, Address::ZERO),
            Err(RegistryError::ZeroAddress(_))
        ));
    }
}
