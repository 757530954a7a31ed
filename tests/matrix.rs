//! Capability matrix tests: defaults, persistence, top-row immutability,
//! and reset behavior.

use foldergate::caps;
use foldergate::{
    CapabilityMatrix, Engine, Error, MemDirectory, MemFolders, Role, Store, UserView,
};
use tempfile::TempDir;

const TOP: u64 = 100;
const PLAIN: u64 = 1;

fn engine(tmp: &TempDir) -> Engine<MemDirectory, MemFolders> {
    let store = Store::open(tmp.path()).unwrap();
    let mut dir = MemDirectory::new();
    dir.add_user(
        UserView { id: TOP, role: Role::Top, branch_id: None, department_id: None, active: true },
        "tina",
    );
    dir.add_user(
        UserView { id: PLAIN, role: Role::User, branch_id: None, department_id: None, active: true },
        "paul",
    );
    Engine::new(store, dir, MemFolders::new()).unwrap()
}

/// The built-in default table: top full, branch admins manage their branch's
/// users, department admins their department's, plain users nothing
#[test]
fn defaults_match_table() {
    let m = CapabilityMatrix::defaults();
    assert_eq!(m.mask(Role::Top), caps::ALL);
    assert_eq!(m.mask(Role::BranchAdmin), caps::MANAGE_BRANCH_USERS);
    assert_eq!(m.mask(Role::DeptAdmin), caps::MANAGE_DEPT_USERS);
    assert_eq!(m.mask(Role::User), 0);
}

/// A capability edit takes effect immediately and survives a reload
#[test]
fn set_persists_and_reloads() {
    let tmp = TempDir::new().unwrap();
    {
        let eng = engine(&tmp);
        eng.set_capability(TOP, Role::BranchAdmin, caps::VIEW_AUDIT_LOGS, true).unwrap();
        eng.set_capability(TOP, Role::BranchAdmin, caps::MANAGE_BRANCH_USERS, false).unwrap();
        assert_eq!(eng.capability_mask(Role::BranchAdmin), caps::VIEW_AUDIT_LOGS);
    }

    let eng = engine(&tmp);
    assert_eq!(eng.capability_mask(Role::BranchAdmin), caps::VIEW_AUDIT_LOGS);
}

/// Edits addressed to the top row are silently ignored; the row stays full
#[test]
fn top_row_immutable() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    eng.set_capability(TOP, Role::Top, caps::MANAGE_ALL_USERS, false).unwrap();
    eng.set_capability(TOP, Role::Top, caps::SYSTEM_SETTINGS, false).unwrap();
    assert_eq!(eng.capability_mask(Role::Top), caps::ALL);

    // Nothing was persisted either.
    let reloaded = CapabilityMatrix::load(eng.store()).unwrap();
    assert_eq!(reloaded.mask(Role::Top), caps::ALL);
}

/// Only a top actor may edit the matrix
#[test]
fn non_top_cannot_edit() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    assert!(matches!(
        eng.set_capability(PLAIN, Role::User, caps::MANAGE_ALL_USERS, true),
        Err(Error::PermissionDenied(_))
    ));
    assert!(matches!(
        eng.reset_capabilities(PLAIN),
        Err(Error::PermissionDenied(_))
    ));
}

/// Reset restores exactly the default table and drops persisted overrides
#[test]
fn reset_restores_defaults() {
    let tmp = TempDir::new().unwrap();
    {
        let eng = engine(&tmp);
        eng.set_capability(TOP, Role::User, caps::VIEW_AUDIT_LOGS, true).unwrap();
        eng.set_capability(TOP, Role::DeptAdmin, caps::MANAGE_DEPT_USERS, false).unwrap();
        eng.reset_capabilities(TOP).unwrap();
        assert_eq!(eng.capability_matrix(), CapabilityMatrix::defaults());
    }

    // Reload from disk: the overrides are gone, not merely shadowed.
    let eng = engine(&tmp);
    assert_eq!(eng.capability_matrix(), CapabilityMatrix::defaults());
}

/// Capability name round-trips used by the API layer
#[test]
fn capability_names() {
    assert_eq!(caps::cap_by_name("manage_branch_users"), Some(caps::MANAGE_BRANCH_USERS));
    assert_eq!(caps::cap_by_name("nope"), None);
    assert_eq!(
        caps::names_to_caps(&["manage_all_users", "system_settings"]),
        caps::MANAGE_ALL_USERS | caps::SYSTEM_SETTINGS
    );
    let names = caps::caps_to_names(caps::MANAGE_DEPT_USERS | caps::VIEW_AUDIT_LOGS);
    assert_eq!(names, vec!["manage_dept_users", "view_audit_logs"]);
}
