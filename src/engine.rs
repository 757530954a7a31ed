//! The exposed operation surface
//!
//! Every permission-sensitive operation goes through here: the engine checks
//! the actor's effective level or capability first, then performs the store
//! mutation. Callers are expected to audit-log successful mutations; the
//! engine itself only emits diagnostics via the `log` facade.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};

use crate::caps;
use crate::directory::{Directory, Folders, FolderView, UserView};
use crate::error::{Error, Result};
use crate::grants::{FolderGrant, FolderGrants, GrantView, PermissionLevel, TargetKind};
use crate::matrix::CapabilityMatrix;
use crate::resolver::{self, OrgContext, Scope};
use crate::role::{can_assign_role, Role};
use crate::store::Store;

/// Authorization engine over an opened store and the external directory
pub struct Engine<D, F> {
    store: Store,
    directory: D,
    folders: F,
    matrix: RwLock<CapabilityMatrix>,
}

impl<D: Directory, F: Folders> Engine<D, F> {
    /// Build an engine; the capability matrix is loaded from persisted
    /// overrides on top of the built-in defaults.
    pub fn new(store: Store, directory: D, folders: F) -> Result<Self> {
        let matrix = CapabilityMatrix::load(&store)?;
        Ok(Engine {
            store,
            directory,
            folders,
            matrix: RwLock::new(matrix),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    pub fn folders_mut(&mut self) -> &mut F {
        &mut self.folders
    }

    fn user(&self, id: u64) -> Result<UserView> {
        self.directory
            .user(id)
            .ok_or(Error::NotFound { what: "user", id })
    }

    fn folder(&self, id: u64) -> Result<FolderView> {
        // Soft-deleted folders are invisible to the engine.
        self.folders
            .folder(id)
            .filter(|f| !f.deleted)
            .ok_or(Error::NotFound { what: "folder", id })
    }

    fn matrix_read(&self) -> RwLockReadGuard<'_, CapabilityMatrix> {
        self.matrix.read().unwrap_or_else(|p| p.into_inner())
    }

    fn matrix_write(&self) -> RwLockWriteGuard<'_, CapabilityMatrix> {
        self.matrix.write().unwrap_or_else(|p| p.into_inner())
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Effective permission level of `user_id` on `folder_id`.
    ///
    /// `Ok(None)` is a valid "no access" answer, not an error; callers must
    /// convert it into a denial response.
    pub fn effective_level(&self, user_id: u64, folder_id: u64) -> Result<Option<PermissionLevel>> {
        let user = self.user(user_id)?;
        let folder = self.folder(folder_id)?;
        let grants = self.store.folder_grants(folder_id)?;
        let org = OrgContext::capture(&self.directory, &user);
        let level = resolver::effective_level(&user, &folder, &grants, org);
        debug!("resolve user {} folder {} -> {:?}", user_id, folder_id, level);
        Ok(level)
    }

    /// Grant management requires `manage` on the folder
    fn require_manage(&self, actor_id: u64, folder_id: u64) -> Result<()> {
        if self.effective_level(actor_id, folder_id)? == Some(PermissionLevel::Manage) {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "user {} cannot manage grants on folder {}",
                actor_id, folder_id
            )))
        }
    }

    // ------------------------------------------------------------------
    // Grant store
    // ------------------------------------------------------------------

    /// Validate a grant target: it must exist, and branch/department targets
    /// must be active.
    fn validate_target(&self, kind: TargetKind, target_id: u64) -> Result<()> {
        match kind {
            TargetKind::User => {
                self.user(target_id)?;
            }
            TargetKind::Branch => {
                let b = self
                    .directory
                    .branch(target_id)
                    .ok_or(Error::NotFound { what: "branch", id: target_id })?;
                if !b.active {
                    return Err(Error::InactiveTarget { kind, id: target_id });
                }
            }
            TargetKind::Department => {
                let d = self
                    .directory
                    .department(target_id)
                    .ok_or(Error::NotFound { what: "department", id: target_id })?;
                if !d.active {
                    return Err(Error::InactiveTarget { kind, id: target_id });
                }
            }
        }
        Ok(())
    }

    fn target_name(&self, kind: TargetKind, target_id: u64) -> Option<String> {
        match kind {
            TargetKind::User => self.directory.user_name(target_id),
            TargetKind::Branch => self.directory.branch_name(target_id),
            TargetKind::Department => self.directory.department_name(target_id),
        }
    }

    fn view(&self, grant: &FolderGrant) -> GrantView {
        GrantView {
            id: grant.id,
            target_id: grant.target_id,
            target_name: self.target_name(grant.target_kind, grant.target_id),
            level: grant.level,
            created_at: grant.created_at,
        }
    }

    /// Create a grant on a folder.
    ///
    /// Requires `manage` on the folder. A duplicate triplet is a `Conflict`;
    /// callers revoke first to change a level.
    pub fn grant(
        &self,
        actor_id: u64,
        folder_id: u64,
        kind: TargetKind,
        target_id: u64,
        level: PermissionLevel,
    ) -> Result<GrantView> {
        self.require_manage(actor_id, folder_id)?;
        self.validate_target(kind, target_id)?;
        let grant = self.store.insert_grant(folder_id, kind, target_id, level)?;
        info!(
            "grant {}: folder {} {} {} -> {}",
            grant.id, folder_id, kind, target_id, level
        );
        Ok(self.view(&grant))
    }

    /// Remove a grant. Requires `manage`; a missing row is `NotFound`.
    pub fn revoke(
        &self,
        actor_id: u64,
        folder_id: u64,
        kind: TargetKind,
        target_id: u64,
    ) -> Result<()> {
        self.require_manage(actor_id, folder_id)?;
        self.store.remove_grant(folder_id, kind, target_id)?;
        info!("revoke: folder {} {} {}", folder_id, kind, target_id);
        Ok(())
    }

    /// Grants for a folder, partitioned by target kind, with display names
    /// resolved at read time. Requires `manage` on the folder.
    pub fn list_grants(&self, actor_id: u64, folder_id: u64) -> Result<FolderGrants> {
        self.require_manage(actor_id, folder_id)?;
        let mut out = FolderGrants::default();
        for grant in self.store.folder_grants(folder_id)? {
            let view = self.view(&grant);
            match grant.target_kind {
                TargetKind::User => out.users.push(view),
                TargetKind::Branch => out.branches.push(view),
                TargetKind::Department => out.departments.push(view),
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Capability matrix
    // ------------------------------------------------------------------

    /// Current capability mask for a role
    pub fn capability_mask(&self, role: Role) -> u64 {
        self.matrix_read().mask(role)
    }

    /// Snapshot of the whole matrix
    pub fn capability_matrix(&self) -> CapabilityMatrix {
        self.matrix_read().clone()
    }

    fn require_top(&self, actor_id: u64) -> Result<UserView> {
        let actor = self.user(actor_id)?;
        if actor.role != Role::Top {
            return Err(Error::PermissionDenied(format!(
                "user {} cannot edit the capability matrix",
                actor_id
            )));
        }
        Ok(actor)
    }

    /// Overwrite one `(role, capability)` field and persist it immediately.
    ///
    /// Only a `top` actor may edit the matrix; an edit addressed to the `top`
    /// row is silently ignored.
    pub fn set_capability(&self, actor_id: u64, role: Role, cap: u64, enabled: bool) -> Result<()> {
        self.require_top(actor_id)?;
        if self.matrix_write().set(role, cap, enabled) {
            self.store.put_matrix_field(role, cap, enabled)?;
            info!("capability {} {:#x} -> {}", role, cap, enabled);
        }
        Ok(())
    }

    /// Restore the built-in default table and drop persisted overrides
    pub fn reset_capabilities(&self, actor_id: u64) -> Result<()> {
        self.require_top(actor_id)?;
        self.matrix_write().reset_to_defaults();
        self.store.clear_matrix()?;
        info!("capability matrix reset to defaults");
        Ok(())
    }

    // ------------------------------------------------------------------
    // User management
    // ------------------------------------------------------------------

    /// The actor's user-management scope
    pub fn user_scope(&self, actor_id: u64) -> Result<Scope> {
        let actor = self.user(actor_id)?;
        Ok(resolver::manageable_scope(&actor, &self.matrix_read()))
    }

    /// Users visible to the actor under their scope
    pub fn manageable_users(&self, actor_id: u64) -> Result<Vec<UserView>> {
        let scope = self.user_scope(actor_id)?;
        Ok(self
            .directory
            .users()
            .into_iter()
            .filter(|u| scope.matches(u))
            .collect())
    }

    /// Users the actor may delete: the manageable set minus `top` users,
    /// which stay visible but are excluded from every deletion decision.
    pub fn deletable_users(&self, actor_id: u64) -> Result<Vec<UserView>> {
        Ok(self
            .manageable_users(actor_id)?
            .into_iter()
            .filter(resolver::deletable)
            .collect())
    }

    /// Capability plus scope check for a mutation on `target`. Visibility
    /// alone carries no edit rights, so the capability is re-checked here.
    fn require_manageable(&self, actor: &UserView, target: &UserView) -> Result<()> {
        let matrix = self.matrix_read();
        if !matrix.any_enabled(actor.role, caps::USER_MANAGEMENT) {
            return Err(Error::PermissionDenied(format!(
                "user {} lacks a user-management capability",
                actor.id
            )));
        }
        let scope = resolver::manageable_scope(actor, &matrix);
        if !scope.matches(target) {
            return Err(Error::PermissionDenied(format!(
                "user {} is outside the scope of user {}",
                target.id, actor.id
            )));
        }
        Ok(())
    }

    /// Validate a role assignment: the target must be manageable by the
    /// actor and the new role must not exceed the actor's own station.
    /// Decision-only; the directory write belongs to the collaborator.
    pub fn authorize_role_assignment(
        &self,
        actor_id: u64,
        target_user_id: u64,
        new_role: Role,
    ) -> Result<()> {
        let actor = self.user(actor_id)?;
        let target = self.user(target_user_id)?;
        self.require_manageable(&actor, &target)?;
        if !can_assign_role(actor.role, new_role) {
            return Err(Error::Escalation { actor: actor.role, requested: new_role });
        }
        Ok(())
    }

    /// Validate a user deletion: scope check plus the blanket rule that
    /// `top` users are never deletable.
    pub fn authorize_user_deletion(&self, actor_id: u64, target_user_id: u64) -> Result<()> {
        let actor = self.user(actor_id)?;
        let target = self.user(target_user_id)?;
        self.require_manageable(&actor, &target)?;
        if !resolver::deletable(&target) {
            return Err(Error::PermissionDenied(format!(
                "user {} holds the top role and cannot be deleted",
                target_user_id
            )));
        }
        Ok(())
    }
}
