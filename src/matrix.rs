//! Per-role capability matrix with explicit load/save
//!
//! An injected configuration object rather than ambient global state, so
//! tests can construct isolated instances. Edits expect a single writer at a
//! time; concurrent edits to the same field resolve last-write-wins, which is
//! acceptable for a rare, admin-only, human-paced operation.

use std::collections::BTreeMap;

use crate::caps;
use crate::error::Result;
use crate::role::Role;
use crate::store::Store;

/// Mutable `Role -> capability mask` table.
///
/// The `top` row is pinned to the full capability set; attempts to change it
/// are silently ignored, matching the disabled control in the admin UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMatrix {
    masks: [u64; 4],
}

impl Default for CapabilityMatrix {
    fn default() -> Self {
        Self::defaults()
    }
}

impl CapabilityMatrix {
    /// The built-in default table (initial state and reset target)
    pub fn defaults() -> Self {
        let mut masks = [0u64; 4];
        for role in Role::ALL {
            masks[Self::idx(role)] = caps::default_mask(role);
        }
        CapabilityMatrix { masks }
    }

    /// Load persisted overrides on top of the defaults
    pub fn load(store: &Store) -> Result<Self> {
        let mut m = Self::defaults();
        for (role, cap, enabled) in store.matrix_fields()? {
            m.set(role, cap, enabled);
        }
        Ok(m)
    }

    /// Capability mask for a role
    #[inline]
    pub fn mask(&self, role: Role) -> u64 {
        self.masks[Self::idx(role)]
    }

    /// Whether `role` holds every bit of `cap`
    #[inline]
    pub fn enabled(&self, role: Role, cap: u64) -> bool {
        self.mask(role) & cap == cap
    }

    /// Whether `role` holds any bit of `mask`
    #[inline]
    pub fn any_enabled(&self, role: Role, mask: u64) -> bool {
        self.mask(role) & mask != 0
    }

    /// Overwrite one `(role, capability)` field.
    ///
    /// Returns whether anything may have changed; `top` edits are a silent
    /// no-op and return `false`.
    pub fn set(&mut self, role: Role, cap: u64, enabled: bool) -> bool {
        if role == Role::Top {
            return false;
        }
        let i = Self::idx(role);
        if enabled {
            self.masks[i] |= cap;
        } else {
            self.masks[i] &= !cap;
        }
        true
    }

    /// Restore the built-in default table (the `top` row is already fixed)
    pub fn reset_to_defaults(&mut self) {
        *self = Self::defaults();
    }

    /// Capability names per role, for API/UI consumption
    pub fn named(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        Role::ALL
            .iter()
            .map(|&r| (r.as_str(), caps::caps_to_names(self.mask(r))))
            .collect()
    }

    #[inline]
    fn idx(role: Role) -> usize {
        role as usize - 1
    }
}
