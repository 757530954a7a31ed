//! Error types for foldergate

use thiserror::Error;

use crate::grants::TargetKind;
use crate::role::Role;

/// The main error type for foldergate operations.
///
/// Every variant is returned as a typed result to the API/UI layer, which is
/// responsible for translating it into a user-facing message. A resolver
/// answer of "no access" is `Ok(None)`, not an error.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A referenced folder, user, branch, department, or grant does not exist.
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: u64 },

    /// Grant attempted against a deactivated branch or department.
    #[error("{kind} {id} is inactive")]
    InactiveTarget { kind: TargetKind, id: u64 },

    /// A grant already exists for this (folder, target kind, target) triplet.
    #[error("duplicate grant on folder {folder_id} for {kind} {target_id}")]
    Conflict {
        folder_id: u64,
        kind: TargetKind,
        target_id: u64,
    },

    /// The actor lacks the level or capability the operation requires.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Attempted role assignment above the actor's own station.
    #[error("role {actor} may not assign role {requested}")]
    Escalation { actor: Role, requested: Role },

    /// Underlying store failure; propagated unchanged, never swallowed.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for foldergate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Convert a store-layer error to [`Error::Store`]
pub(crate) fn err<E: std::fmt::Display>(e: E) -> Error {
    Error::Store(e.to_string())
}
