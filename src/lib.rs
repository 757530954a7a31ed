//! Foldergate - authorization engine for multi-tenant folder sharing
//!
//! The permission core of a file-sharing service: a role/capability matrix
//! governing administrative actions, per-folder permission grants addressed
//! to users, branches, or departments, and the resolution of effective
//! access from those possibly-conflicting sources. File storage, uploads,
//! share links, versioning, sessions, and UI rendering are external
//! collaborators that consume this engine's decisions.
//!
//! Grants and capability-matrix overrides persist in LMDB via an injected
//! [`Store`]; the org directory is read through the [`Directory`]/[`Folders`]
//! traits and never owned here.

pub mod caps;
pub mod directory;
pub mod engine;
pub mod error;
pub mod grants;
pub mod matrix;
pub mod resolver;
pub mod role;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

pub use directory::{
    BranchView, DepartmentView, Directory, FolderView, Folders, MemDirectory, MemFolders, UserView,
};
pub use engine::Engine;
pub use error::{Error, Result};
pub use grants::{FolderGrant, FolderGrants, GrantView, PermissionLevel, TargetKind};
pub use matrix::CapabilityMatrix;
pub use resolver::{deletable, effective_level, manageable_scope, OrgContext, Scope};
pub use role::{can_assign_role, Role};
pub use store::Store;
