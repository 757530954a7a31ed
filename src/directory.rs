//! Read-only views of the org directory and folder metadata
//!
//! The engine queries but never owns this data. Real deployments back these
//! traits with the tenant database; tests and the demo server use the
//! in-memory implementations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: u64,
    pub role: Role,
    pub branch_id: Option<u64>,
    pub department_id: Option<u64>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchView {
    pub id: u64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentView {
    pub id: u64,
    pub branch_id: Option<u64>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderView {
    pub id: u64,
    pub owner_user_id: u64,
    pub deleted: bool,
}

/// Read-only directory of users, branches and departments.
///
/// Display names are resolved lazily so grant listings always reflect the
/// current name without touching stored rows.
pub trait Directory {
    fn user(&self, id: u64) -> Option<UserView>;
    fn branch(&self, id: u64) -> Option<BranchView>;
    fn department(&self, id: u64) -> Option<DepartmentView>;
    fn users(&self) -> Vec<UserView>;

    fn user_name(&self, id: u64) -> Option<String> {
        let _ = id;
        None
    }
    fn branch_name(&self, id: u64) -> Option<String> {
        let _ = id;
        None
    }
    fn department_name(&self, id: u64) -> Option<String> {
        let _ = id;
        None
    }
}

/// Read-only folder metadata
pub trait Folders {
    fn folder(&self, id: u64) -> Option<FolderView>;
}

/// In-memory directory for tests and demos
#[derive(Debug, Default)]
pub struct MemDirectory {
    users: HashMap<u64, (UserView, String)>,
    branches: HashMap<u64, (BranchView, String)>,
    departments: HashMap<u64, (DepartmentView, String)>,
}

impl MemDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: UserView, name: &str) {
        self.users.insert(user.id, (user, name.to_string()));
    }

    pub fn add_branch(&mut self, branch: BranchView, name: &str) {
        self.branches.insert(branch.id, (branch, name.to_string()));
    }

    pub fn add_department(&mut self, department: DepartmentView, name: &str) {
        self.departments.insert(department.id, (department, name.to_string()));
    }

    pub fn rename_branch(&mut self, id: u64, name: &str) {
        if let Some(entry) = self.branches.get_mut(&id) {
            entry.1 = name.to_string();
        }
    }

    pub fn set_branch_active(&mut self, id: u64, active: bool) {
        if let Some(entry) = self.branches.get_mut(&id) {
            entry.0.active = active;
        }
    }

    pub fn set_department_active(&mut self, id: u64, active: bool) {
        if let Some(entry) = self.departments.get_mut(&id) {
            entry.0.active = active;
        }
    }
}

impl Directory for MemDirectory {
    fn user(&self, id: u64) -> Option<UserView> {
        self.users.get(&id).map(|(u, _)| *u)
    }

    fn branch(&self, id: u64) -> Option<BranchView> {
        self.branches.get(&id).map(|(b, _)| *b)
    }

    fn department(&self, id: u64) -> Option<DepartmentView> {
        self.departments.get(&id).map(|(d, _)| *d)
    }

    fn users(&self) -> Vec<UserView> {
        let mut all: Vec<UserView> = self.users.values().map(|(u, _)| *u).collect();
        all.sort_by_key(|u| u.id);
        all
    }

    fn user_name(&self, id: u64) -> Option<String> {
        self.users.get(&id).map(|(_, n)| n.clone())
    }

    fn branch_name(&self, id: u64) -> Option<String> {
        self.branches.get(&id).map(|(_, n)| n.clone())
    }

    fn department_name(&self, id: u64) -> Option<String> {
        self.departments.get(&id).map(|(_, n)| n.clone())
    }
}

/// In-memory folder metadata for tests and demos
#[derive(Debug, Default)]
pub struct MemFolders {
    folders: HashMap<u64, FolderView>,
}

impl MemFolders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_folder(&mut self, folder: FolderView) {
        self.folders.insert(folder.id, folder);
    }

    pub fn set_deleted(&mut self, id: u64, deleted: bool) {
        if let Some(f) = self.folders.get_mut(&id) {
            f.deleted = deleted;
        }
    }
}

impl Folders for MemFolders {
    fn folder(&self, id: u64) -> Option<FolderView> {
        self.folders.get(&id).copied()
    }
}
