//! Administrative capability bits and the built-in default matrix

use crate::role::Role;

// Capability bit constants
pub const MANAGE_ALL_USERS: u64 = 1;
pub const MANAGE_BRANCH_USERS: u64 = 1 << 1;
pub const MANAGE_DEPT_USERS: u64 = 1 << 2;
pub const MANAGE_BRANCHES: u64 = 1 << 3;
pub const MANAGE_DEPARTMENTS: u64 = 1 << 4;
pub const VIEW_AUDIT_LOGS: u64 = 1 << 5;
pub const SYSTEM_SETTINGS: u64 = 1 << 6;

/// Every capability bit
pub const ALL: u64 = MANAGE_ALL_USERS
    | MANAGE_BRANCH_USERS
    | MANAGE_DEPT_USERS
    | MANAGE_BRANCHES
    | MANAGE_DEPARTMENTS
    | VIEW_AUDIT_LOGS
    | SYSTEM_SETTINGS;

/// Any capability that scopes user management
pub const USER_MANAGEMENT: u64 = MANAGE_ALL_USERS | MANAGE_BRANCH_USERS | MANAGE_DEPT_USERS;

// Capability name mappings
const CAPS: &[(&str, u64)] = &[
    ("manage_all_users", MANAGE_ALL_USERS),
    ("manage_branch_users", MANAGE_BRANCH_USERS),
    ("manage_dept_users", MANAGE_DEPT_USERS),
    ("manage_branches", MANAGE_BRANCHES),
    ("manage_departments", MANAGE_DEPARTMENTS),
    ("view_audit_logs", VIEW_AUDIT_LOGS),
    ("system_settings", SYSTEM_SETTINGS),
];

/// Convert a capability mask to a list of capability names
pub fn caps_to_names(mask: u64) -> Vec<&'static str> {
    CAPS.iter()
        .filter(|(_, b)| mask & b == *b)
        .map(|(n, _)| *n)
        .collect()
}

/// Convert capability names to a combined mask (unknown names are ignored)
pub fn names_to_caps(names: &[&str]) -> u64 {
    names
        .iter()
        .filter_map(|n| CAPS.iter().find(|(k, _)| k == n).map(|(_, v)| v))
        .fold(0, |a, b| a | b)
}

/// Look up a single capability bit by name
pub fn cap_by_name(name: &str) -> Option<u64> {
    CAPS.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
}

/// Built-in default mask for a role.
///
/// Used both as the initial matrix state and as the reset target. Everything
/// outside this table defaults to off for non-top roles and is
/// admin-toggleable; `top` is fixed at the full set.
pub fn default_mask(role: Role) -> u64 {
    match role {
        Role::Top => ALL,
        Role::BranchAdmin => MANAGE_BRANCH_USERS,
        Role::DeptAdmin => MANAGE_DEPT_USERS,
        Role::User => 0,
    }
}
