//! Pure permission resolution
//!
//! Effective folder access, the user-management scope predicate, and the
//! deletion rule. Everything here is a side-effect-free computation over
//! already-loaded views; callers own snapshotting and any caching.

use crate::caps;
use crate::directory::{Directory, FolderView, UserView};
use crate::grants::{FolderGrant, PermissionLevel, TargetKind};
use crate::matrix::CapabilityMatrix;
use crate::role::Role;

/// Whether the acting user's branch/department are currently active,
/// captured once per resolution call
#[derive(Debug, Clone, Copy, Default)]
pub struct OrgContext {
    pub branch_active: bool,
    pub department_active: bool,
}

impl OrgContext {
    /// Snapshot the active flags for `user`'s memberships
    pub fn capture<D: Directory>(dir: &D, user: &UserView) -> OrgContext {
        OrgContext {
            branch_active: user
                .branch_id
                .and_then(|id| dir.branch(id))
                .map(|b| b.active)
                .unwrap_or(false),
            department_active: user
                .department_id
                .and_then(|id| dir.department(id))
                .map(|d| d.active)
                .unwrap_or(false),
        }
    }
}

/// Resolve the effective permission level of `user` on `folder`.
///
/// Priority order, short-circuiting:
/// 1. `top` role: unconditional `manage`.
/// 2. Folder owner: `manage`, even with zero grants.
/// 3. Otherwise the max over matching grants: a direct user grant, a grant on
///    the user's branch (only while the branch is active), or a grant on the
///    user's department (only while the department is active).
///
/// The max reduction makes the tie-break explicit: most-permissive source
/// wins. `view` via department plus `edit` via a direct grant yields `edit`.
///
/// `None` means no access at all, never partial access; callers translate it
/// into a denial response.
pub fn effective_level(
    user: &UserView,
    folder: &FolderView,
    grants: &[FolderGrant],
    org: OrgContext,
) -> Option<PermissionLevel> {
    if user.role == Role::Top {
        return Some(PermissionLevel::Manage);
    }
    if user.id == folder.owner_user_id {
        return Some(PermissionLevel::Manage);
    }
    grants
        .iter()
        .filter(|g| g.folder_id == folder.id && applies(g, user, org))
        .map(|g| g.level)
        .max()
}

fn applies(grant: &FolderGrant, user: &UserView, org: OrgContext) -> bool {
    match grant.target_kind {
        TargetKind::User => grant.target_id == user.id,
        TargetKind::Branch => org.branch_active && user.branch_id == Some(grant.target_id),
        TargetKind::Department => {
            org.department_active && user.department_id == Some(grant.target_id)
        }
    }
}

/// Which users an administrator may see and manage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Branch(u64),
    Department(u64),
    SelfOnly(u64),
}

impl Scope {
    /// The scope predicate over the user set
    pub fn matches(&self, user: &UserView) -> bool {
        match *self {
            Scope::All => true,
            Scope::Branch(b) => user.branch_id == Some(b),
            Scope::Department(d) => user.department_id == Some(d),
            Scope::SelfOnly(id) => user.id == id,
        }
    }
}

/// Derive the actor's user-management scope from the capability matrix.
///
/// Strict priority: `manage_all_users` beats `manage_branch_users` beats
/// `manage_dept_users`; with none of them the actor only sees themselves.
/// An admin holding a branch/department capability without the matching
/// membership degrades to self-only rather than matching every unassigned
/// user. Visibility alone never implies edit rights.
pub fn manageable_scope(actor: &UserView, matrix: &CapabilityMatrix) -> Scope {
    if matrix.enabled(actor.role, caps::MANAGE_ALL_USERS) {
        return Scope::All;
    }
    if matrix.enabled(actor.role, caps::MANAGE_BRANCH_USERS) {
        return match actor.branch_id {
            Some(b) => Scope::Branch(b),
            None => Scope::SelfOnly(actor.id),
        };
    }
    if matrix.enabled(actor.role, caps::MANAGE_DEPT_USERS) {
        return match actor.department_id {
            Some(d) => Scope::Department(d),
            None => Scope::SelfOnly(actor.id),
        };
    }
    Scope::SelfOnly(actor.id)
}

/// Blanket rule: `top` users are never deletable, regardless of actor
#[inline]
pub fn deletable(user: &UserView) -> bool {
    user.role != Role::Top
}
