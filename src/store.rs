//! LMDB-backed persistence for grants and the capability matrix
//!
//! The store is an injected handle, not ambient global state; tests open an
//! isolated store per temporary directory. Grant rows live under a 17-byte
//! key of `folder_id (BE) | target_kind tag | target_id (BE)`, so one prefix
//! scan lists a folder's grant set. Matrix overrides live one row per
//! `(role, capability)` field, keeping concurrent edits to different fields
//! independent.

use std::path::Path;

use byteorder::BigEndian;
use heed::types::{Bytes, SerdeJson, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};

use crate::error::{err, Result};
use crate::grants::{GrantRow, TargetKind};
use crate::role::Role;

/// Compose the 17-byte grant key: folder id, target kind tag, target id
#[inline]
pub(crate) fn grant_key(folder_id: u64, kind: TargetKind, target_id: u64) -> [u8; 17] {
    let mut k = [0u8; 17];
    k[..8].copy_from_slice(&folder_id.to_be_bytes());
    k[8] = kind as u8;
    k[9..].copy_from_slice(&target_id.to_be_bytes());
    k
}

/// Persistent engine state: grant rows, capability-matrix overrides, counters
pub struct Store {
    env: Env,
    pub(crate) grants: Database<Bytes, SerdeJson<GrantRow>>,
    pub(crate) matrix: Database<Str, U64<BigEndian>>,
    pub(crate) meta: Database<Str, Str>,
}

impl Store {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(err)?;
        // SAFETY: LMDB requires no other process to open this path concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1 << 30)
                .max_dbs(3)
                .open(path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let grants = env.create_database(&mut tx, Some("grants")).map_err(err)?;
        let matrix = env.create_database(&mut tx, Some("matrix")).map_err(err)?;
        let meta = env.create_database(&mut tx, Some("meta")).map_err(err)?;
        tx.commit().map_err(err)?;
        Ok(Store { env, grants, matrix, meta })
    }

    /// Execute a read-only operation against one consistent snapshot
    #[inline]
    pub(crate) fn read<T, F: FnOnce(&Store, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(self, &self.env.read_txn().map_err(err)?)
    }

    /// Execute a write operation in a single committed transaction
    #[inline]
    pub(crate) fn write<T, F: FnOnce(&Store, &mut RwTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut txn = self.env.write_txn().map_err(err)?;
        let r = f(self, &mut txn)?;
        txn.commit().map_err(err)?;
        Ok(r)
    }

    /// Allocate the next grant id
    pub(crate) fn next_id(&self, tx: &mut RwTxn) -> Result<u64> {
        let id = self
            .meta
            .get(tx, "next_id")
            .map_err(err)?
            .and_then(|s| s.parse().ok())
            .unwrap_or(1u64);
        self.meta.put(tx, "next_id", &(id + 1).to_string()).map_err(err)?;
        Ok(id)
    }

    /// Persist one `(role, capability)` matrix field (last-write-wins)
    pub(crate) fn put_matrix_field(&self, role: Role, cap: u64, enabled: bool) -> Result<()> {
        let key = format!("{}/{:04x}", role.as_str(), cap);
        self.write(|s, tx| s.matrix.put(tx, &key, &(enabled as u64)).map_err(err))
    }

    /// All persisted matrix overrides
    pub(crate) fn matrix_fields(&self) -> Result<Vec<(Role, u64, bool)>> {
        self.read(|s, tx| {
            let mut out = Vec::new();
            for item in s.matrix.iter(tx).map_err(err)? {
                let (k, v) = item.map_err(err)?;
                if let Some((role, cap)) = parse_matrix_key(k) {
                    out.push((role, cap, v != 0));
                }
            }
            Ok(out)
        })
    }

    /// Drop all persisted matrix overrides (reset to built-in defaults)
    pub(crate) fn clear_matrix(&self) -> Result<()> {
        self.write(|s, tx| s.matrix.clear(tx).map_err(err))
    }

    /// Clear all databases (for testing)
    pub fn clear_all(&self) -> Result<()> {
        self.write(|s, tx| {
            s.grants.clear(tx).map_err(err)?;
            s.matrix.clear(tx).map_err(err)?;
            s.meta.clear(tx).map_err(err)
        })
    }
}

fn parse_matrix_key(k: &str) -> Option<(Role, u64)> {
    let (role, cap) = k.split_once('/')?;
    Some((Role::from_name(role)?, u64::from_str_radix(cap, 16).ok()?))
}
