//! Role hierarchy and the escalation guard

use serde::{Deserialize, Serialize};

/// Administrative role, totally ordered by privilege level (`4 > 3 > 2 > 1`).
///
/// The ordering is used for escalation checks only; what a role may actually
/// do is governed by the capability matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    User = 1,
    DeptAdmin = 2,
    BranchAdmin = 3,
    Top = 4,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::DeptAdmin, Role::BranchAdmin, Role::Top];

    /// Numeric privilege level
    #[inline]
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::DeptAdmin => "dept_admin",
            Role::BranchAdmin => "branch_admin",
            Role::Top => "top",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "user" => Some(Role::User),
            "dept_admin" => Some(Role::DeptAdmin),
            "branch_admin" => Some(Role::BranchAdmin),
            "top" => Some(Role::Top),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an actor with `actor_role` may assign `target_role` to a user.
///
/// A single total-order comparison, applied on every role create/edit.
/// Without it, scope-limited admins could hand out roles above their own
/// station.
#[inline]
pub fn can_assign_role(actor_role: Role, target_role: Role) -> bool {
    target_role.level() <= actor_role.level()
}
