//! Folder permission grants: model types and store operations
//!
//! A grant associates one folder with one target (user, branch, or
//! department) at one permission level. Grants are independent per folder;
//! there is no folder hierarchy or inheritance in this model. Rows are
//! created by `insert_grant` and destroyed by `remove_grant`, never mutated
//! in place.

use serde::{Deserialize, Serialize};

use crate::error::{err, Error, Result};
use crate::store::{grant_key, Store};

/// Permission level, ordered `view < edit < manage`.
///
/// Effective-level merging takes the max over this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    View,
    Edit,
    Manage,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::View => "view",
            PermissionLevel::Edit => "edit",
            PermissionLevel::Manage => "manage",
        }
    }

    pub fn from_name(name: &str) -> Option<PermissionLevel> {
        match name {
            "view" => Some(PermissionLevel::View),
            "edit" => Some(PermissionLevel::Edit),
            "manage" => Some(PermissionLevel::Manage),
            _ => None,
        }
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a grant is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TargetKind {
    User = 1,
    Branch = 2,
    Department = 3,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::User => "user",
            TargetKind::Branch => "branch",
            TargetKind::Department => "department",
        }
    }

    pub fn from_name(name: &str) -> Option<TargetKind> {
        match name {
            "user" => Some(TargetKind::User),
            "branch" => Some(TargetKind::Branch),
            "department" => Some(TargetKind::Department),
            _ => None,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<TargetKind> {
        match tag {
            1 => Some(TargetKind::User),
            2 => Some(TargetKind::Branch),
            3 => Some(TargetKind::Department),
            _ => None,
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored value half of a grant row; the key carries folder, kind and target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRow {
    pub id: u64,
    pub level: PermissionLevel,
    pub created_at: u64,
}

/// One folder-permission grant, fully keyed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderGrant {
    pub id: u64,
    pub folder_id: u64,
    pub target_kind: TargetKind,
    pub target_id: u64,
    pub level: PermissionLevel,
    pub created_at: u64,
}

/// A grant as returned to callers, with the target's display name resolved
/// at read time (a weak reference: renaming a branch is reflected without
/// touching grant rows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantView {
    pub id: u64,
    pub target_id: u64,
    pub target_name: Option<String>,
    pub level: PermissionLevel,
    pub created_at: u64,
}

/// Grants for one folder, partitioned by target kind
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderGrants {
    pub users: Vec<GrantView>,
    pub branches: Vec<GrantView>,
    pub departments: Vec<GrantView>,
}

fn current_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Store {
    /// Insert a grant, or fail with `Conflict` if the
    /// `(folder, target_kind, target)` triplet already holds a row. The
    /// uniqueness check and the insert share one write transaction, so two
    /// concurrent calls for the same triplet cannot both succeed.
    pub fn insert_grant(
        &self,
        folder_id: u64,
        kind: TargetKind,
        target_id: u64,
        level: PermissionLevel,
    ) -> Result<FolderGrant> {
        self.write(|s, tx| {
            let key = grant_key(folder_id, kind, target_id);
            if s.grants.get(tx, &key).map_err(err)?.is_some() {
                return Err(Error::Conflict { folder_id, kind, target_id });
            }
            let row = GrantRow {
                id: s.next_id(tx)?,
                level,
                created_at: current_epoch(),
            };
            s.grants.put(tx, &key, &row).map_err(err)?;
            Ok(FolderGrant {
                id: row.id,
                folder_id,
                target_kind: kind,
                target_id,
                level,
                created_at: row.created_at,
            })
        })
    }

    /// Remove a grant. `NotFound` when no row matches: double-revoke is an
    /// error signal, not an idempotent success.
    pub fn remove_grant(&self, folder_id: u64, kind: TargetKind, target_id: u64) -> Result<()> {
        self.write(|s, tx| {
            let removed = s
                .grants
                .delete(tx, &grant_key(folder_id, kind, target_id))
                .map_err(err)?;
            if !removed {
                return Err(Error::NotFound { what: "grant", id: target_id });
            }
            Ok(())
        })
    }

    /// Look up a single grant by its triplet
    pub fn find_grant(
        &self,
        folder_id: u64,
        kind: TargetKind,
        target_id: u64,
    ) -> Result<Option<FolderGrant>> {
        self.read(|s, tx| {
            Ok(s.grants
                .get(tx, &grant_key(folder_id, kind, target_id))
                .map_err(err)?
                .map(|row| FolderGrant {
                    id: row.id,
                    folder_id,
                    target_kind: kind,
                    target_id,
                    level: row.level,
                    created_at: row.created_at,
                }))
        })
    }

    /// All grants for one folder (prefix scan on the folder id)
    pub fn folder_grants(&self, folder_id: u64) -> Result<Vec<FolderGrant>> {
        self.read(|s, tx| {
            let mut out = Vec::new();
            for item in s
                .grants
                .prefix_iter(tx, &folder_id.to_be_bytes())
                .map_err(err)?
            {
                let (k, row) = item.map_err(err)?;
                if k.len() != 17 {
                    continue;
                }
                let Some(kind) = TargetKind::from_tag(k[8]) else { continue };
                out.push(FolderGrant {
                    id: row.id,
                    folder_id,
                    target_kind: kind,
                    target_id: u64::from_be_bytes(k[9..17].try_into().unwrap()),
                    level: row.level,
                    created_at: row.created_at,
                });
            }
            Ok(out)
        })
    }
}
