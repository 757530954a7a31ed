//! Grant store tests: uniqueness, revocation semantics, target validation,
//! partitioned listings, and persistence across reopen.

use foldergate::{
    BranchView, DepartmentView, Engine, Error, FolderView, MemDirectory, MemFolders,
    PermissionLevel, Role, Store, TargetKind, UserView,
};
use tempfile::TempDir;

const OWNER: u64 = 9;
const ALICE: u64 = 1;

fn seeded_directory() -> (MemDirectory, MemFolders) {
    let mut dir = MemDirectory::new();
    dir.add_user(
        UserView { id: ALICE, role: Role::User, branch_id: Some(1), department_id: Some(1), active: true },
        "alice",
    );
    dir.add_user(
        UserView { id: OWNER, role: Role::User, branch_id: None, department_id: None, active: true },
        "owen",
    );
    dir.add_user(
        UserView { id: 100, role: Role::Top, branch_id: None, department_id: None, active: true },
        "tina",
    );
    dir.add_branch(BranchView { id: 1, active: true }, "North Branch");
    dir.add_branch(BranchView { id: 2, active: false }, "Closed Branch");
    dir.add_department(DepartmentView { id: 1, branch_id: Some(1), active: true }, "Engineering");
    dir.add_department(DepartmentView { id: 2, branch_id: Some(1), active: false }, "Mothballed");

    let mut folders = MemFolders::new();
    folders.add_folder(FolderView { id: 1, owner_user_id: OWNER, deleted: false });
    folders.add_folder(FolderView { id: 2, owner_user_id: OWNER, deleted: true });
    (dir, folders)
}

fn engine(tmp: &TempDir) -> Engine<MemDirectory, MemFolders> {
    let store = Store::open(tmp.path()).unwrap();
    let (dir, folders) = seeded_directory();
    Engine::new(store, dir, folders).unwrap()
}

/// A second grant for the same (folder, kind, target) triplet conflicts and
/// the store keeps exactly one row
#[test]
fn duplicate_grant_conflicts() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    eng.grant(OWNER, 1, TargetKind::User, ALICE, PermissionLevel::View).unwrap();
    let second = eng.grant(OWNER, 1, TargetKind::User, ALICE, PermissionLevel::Edit);
    assert!(matches!(second, Err(Error::Conflict { .. })));

    let rows = eng.store().folder_grants(1).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].level, PermissionLevel::View);
}

/// Revoking a grant that does not exist is an error, not a silent success
#[test]
fn revoke_missing_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    let r = eng.revoke(OWNER, 1, TargetKind::User, ALICE);
    assert!(matches!(r, Err(Error::NotFound { .. })));
}

/// Changing a level is revoke + grant; the new row gets a fresh id
#[test]
fn revoke_then_regrant_changes_level() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    let first = eng.grant(OWNER, 1, TargetKind::User, ALICE, PermissionLevel::View).unwrap();
    eng.revoke(OWNER, 1, TargetKind::User, ALICE).unwrap();
    let second = eng.grant(OWNER, 1, TargetKind::User, ALICE, PermissionLevel::Manage).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(
        eng.effective_level(ALICE, 1).unwrap(),
        Some(PermissionLevel::Manage)
    );
}

/// Double revoke: the second call reports the missing grant
#[test]
fn double_revoke_errors() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    eng.grant(OWNER, 1, TargetKind::Branch, 1, PermissionLevel::Edit).unwrap();
    eng.revoke(OWNER, 1, TargetKind::Branch, 1).unwrap();
    assert!(matches!(
        eng.revoke(OWNER, 1, TargetKind::Branch, 1),
        Err(Error::NotFound { .. })
    ));
}

/// Granting to a deactivated branch or department is rejected at write time
#[test]
fn inactive_target_rejected() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    let branch = eng.grant(OWNER, 1, TargetKind::Branch, 2, PermissionLevel::View);
    assert!(matches!(branch, Err(Error::InactiveTarget { kind: TargetKind::Branch, id: 2 })));

    let dept = eng.grant(OWNER, 1, TargetKind::Department, 2, PermissionLevel::View);
    assert!(matches!(dept, Err(Error::InactiveTarget { kind: TargetKind::Department, id: 2 })));

    assert!(eng.store().folder_grants(1).unwrap().is_empty());
}

/// Granting to a target that does not exist is rejected at write time
#[test]
fn unknown_target_rejected() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    assert!(matches!(
        eng.grant(OWNER, 1, TargetKind::User, 777, PermissionLevel::View),
        Err(Error::NotFound { what: "user", .. })
    ));
    assert!(matches!(
        eng.grant(OWNER, 1, TargetKind::Branch, 777, PermissionLevel::View),
        Err(Error::NotFound { what: "branch", .. })
    ));
}

/// Grant operations against a soft-deleted folder see no folder at all
#[test]
fn deleted_folder_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    assert!(matches!(
        eng.grant(OWNER, 2, TargetKind::User, ALICE, PermissionLevel::View),
        Err(Error::NotFound { what: "folder", .. })
    ));
    assert!(matches!(
        eng.effective_level(ALICE, 2),
        Err(Error::NotFound { what: "folder", .. })
    ));
}

/// Listings are partitioned by target kind and carry display names resolved
/// at read time
#[test]
fn list_partitions_and_names() {
    let tmp = TempDir::new().unwrap();
    let mut eng = engine(&tmp);

    eng.grant(OWNER, 1, TargetKind::User, ALICE, PermissionLevel::View).unwrap();
    eng.grant(OWNER, 1, TargetKind::Branch, 1, PermissionLevel::Edit).unwrap();
    eng.grant(OWNER, 1, TargetKind::Department, 1, PermissionLevel::Manage).unwrap();

    let listed = eng.list_grants(OWNER, 1).unwrap();
    assert_eq!(listed.users.len(), 1);
    assert_eq!(listed.branches.len(), 1);
    assert_eq!(listed.departments.len(), 1);
    assert_eq!(listed.users[0].target_name.as_deref(), Some("alice"));
    assert_eq!(listed.branches[0].target_name.as_deref(), Some("North Branch"));
    assert_eq!(listed.departments[0].target_name.as_deref(), Some("Engineering"));

    // Renaming the branch shows up on the next read without touching the row.
    eng.directory_mut().rename_branch(1, "North-East Branch");
    let listed = eng.list_grants(OWNER, 1).unwrap();
    assert_eq!(listed.branches[0].target_name.as_deref(), Some("North-East Branch"));
}

/// Grant management requires `manage` on the folder
#[test]
fn grant_requires_manage_level() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    // Alice has no access at all.
    assert!(matches!(
        eng.grant(ALICE, 1, TargetKind::User, ALICE, PermissionLevel::View),
        Err(Error::PermissionDenied(_))
    ));

    // A top actor manages any folder.
    eng.grant(100, 1, TargetKind::User, ALICE, PermissionLevel::View).unwrap();
    eng.revoke(100, 1, TargetKind::User, ALICE).unwrap();
}

/// Grants survive a store reopen
#[test]
fn grants_persist_across_reopen() {
    let tmp = TempDir::new().unwrap();
    {
        let eng = engine(&tmp);
        eng.grant(OWNER, 1, TargetKind::Branch, 1, PermissionLevel::Edit).unwrap();
    }

    let eng = engine(&tmp);
    let rows = eng.store().folder_grants(1).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].target_kind, TargetKind::Branch);
    assert_eq!(rows[0].level, PermissionLevel::Edit);
    assert_eq!(eng.effective_level(ALICE, 1).unwrap(), Some(PermissionLevel::Edit));
}
