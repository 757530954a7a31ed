//! End-to-end scenario: a folder shared to a branch
//!
//! Folder F1 is owned by U9. U1 (plain user in branch B1) starts with no
//! access; after the owner grants `edit` to B1, U1 can work with the folder
//! at edit level but still cannot manage its grants.

use foldergate::{
    BranchView, Engine, Error, FolderView, MemDirectory, MemFolders, PermissionLevel, Role, Store,
    TargetKind, UserView,
};
use tempfile::TempDir;

const U1: u64 = 1;
const U9: u64 = 9;
const TOP: u64 = 100;
const B1: u64 = 11;
const F1: u64 = 51;

fn engine(tmp: &TempDir) -> Engine<MemDirectory, MemFolders> {
    let store = Store::open(tmp.path()).unwrap();
    let mut dir = MemDirectory::new();
    dir.add_user(
        UserView { id: U1, role: Role::User, branch_id: Some(B1), department_id: None, active: true },
        "uma",
    );
    dir.add_user(
        UserView { id: U9, role: Role::User, branch_id: None, department_id: None, active: true },
        "owen",
    );
    dir.add_user(
        UserView { id: TOP, role: Role::Top, branch_id: None, department_id: None, active: true },
        "tina",
    );
    dir.add_branch(BranchView { id: B1, active: true }, "Branch One");
    let mut folders = MemFolders::new();
    folders.add_folder(FolderView { id: F1, owner_user_id: U9, deleted: false });
    Engine::new(store, dir, folders).unwrap()
}

#[test]
fn branch_share_lifecycle() {
    let tmp = TempDir::new().unwrap();
    let mut eng = engine(&tmp);

    // No grant: U1's list/upload request must be denied outright.
    assert_eq!(eng.effective_level(U1, F1).unwrap(), None);

    // The owner manages the folder without any grant rows.
    assert_eq!(eng.effective_level(U9, F1).unwrap(), Some(PermissionLevel::Manage));

    // Owner shares the folder with branch B1 at edit level.
    let view = eng.grant(U9, F1, TargetKind::Branch, B1, PermissionLevel::Edit).unwrap();
    assert_eq!(view.target_name.as_deref(), Some("Branch One"));

    // U1 now gets edit access through branch membership: uploads allowed...
    assert_eq!(eng.effective_level(U1, F1).unwrap(), Some(PermissionLevel::Edit));

    // ...but grant management stays denied at edit level.
    assert!(matches!(
        eng.list_grants(U1, F1),
        Err(Error::PermissionDenied(_))
    ));
    assert!(matches!(
        eng.grant(U1, F1, TargetKind::User, U1, PermissionLevel::Manage),
        Err(Error::PermissionDenied(_))
    ));

    // Deactivating the branch suspends the access without touching the row.
    eng.directory_mut().set_branch_active(B1, false);
    assert_eq!(eng.effective_level(U1, F1).unwrap(), None);
    assert_eq!(eng.store().folder_grants(F1).unwrap().len(), 1);

    // Reactivation restores it.
    eng.directory_mut().set_branch_active(B1, true);
    assert_eq!(eng.effective_level(U1, F1).unwrap(), Some(PermissionLevel::Edit));

    // A top-role user bypasses grants entirely.
    assert_eq!(eng.effective_level(TOP, F1).unwrap(), Some(PermissionLevel::Manage));

    // Owner revokes the share; U1 is back to no access.
    eng.revoke(U9, F1, TargetKind::Branch, B1).unwrap();
    assert_eq!(eng.effective_level(U1, F1).unwrap(), None);
}

/// A direct user grant and a branch grant merge most-permissive through the
/// full engine path, not just the pure resolver
#[test]
fn merge_through_engine() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    eng.grant(U9, F1, TargetKind::User, U1, PermissionLevel::View).unwrap();
    eng.grant(U9, F1, TargetKind::Branch, B1, PermissionLevel::Manage).unwrap();
    assert_eq!(eng.effective_level(U1, F1).unwrap(), Some(PermissionLevel::Manage));

    // With manage via the branch, U1 may now administer grants too.
    let listed = eng.list_grants(U1, F1).unwrap();
    assert_eq!(listed.users.len(), 1);
    assert_eq!(listed.branches.len(), 1);
}

/// Resolution against unknown users or folders is a typed NotFound
#[test]
fn unknown_ids_are_not_found() {
    let tmp = TempDir::new().unwrap();
    let eng = engine(&tmp);

    assert!(matches!(
        eng.effective_level(777, F1),
        Err(Error::NotFound { what: "user", .. })
    ));
    assert!(matches!(
        eng.effective_level(U1, 777),
        Err(Error::NotFound { what: "folder", .. })
    ));
}
