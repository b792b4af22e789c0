//! Role-based capability checks.
//!
//! A pure predicate over the actor's role snapshot: no hierarchy beyond the
//! single implication that Admin passes every Police check. An actor whose
//! roles could not be resolved (the command arrived outside a recognized
//! member context) fails every role-gated check.

use crate::config::RegistryConfig;
use crate::ids::{RoleId, UserId};

/// Authorization level required by an operation, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    /// No role required; operations on one's own record.
    Member,
    Police,
    Admin,
}

/// The invoking user together with an immutable snapshot of their roles,
/// taken when the command arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    roles: Option<Vec<RoleId>>,
}

impl Actor {
    pub fn member(id: UserId, roles: Vec<RoleId>) -> Self {
        Self {
            id,
            roles: Some(roles),
        }
    }

    /// An actor whose role set could not be resolved.
    pub fn unresolved(id: UserId) -> Self {
        Self { id, roles: None }
    }

    fn holds_any(&self, granted: &[RoleId]) -> bool {
        match &self.roles {
            Some(roles) => roles.iter().any(|role| granted.contains(role)),
            None => false,
        }
    }
}

pub fn has_capability(config: &RegistryConfig, actor: &Actor, required: Capability) -> bool {
    match required {
        Capability::Member => true,
        Capability::Police => {
            actor.holds_any(&config.police_role_ids) || actor.holds_any(&config.admin_role_ids)
        }
        Capability::Admin => actor.holds_any(&config.admin_role_ids),
    }
}
