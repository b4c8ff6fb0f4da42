//! Roles

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{dedup_ids, RoleMenu, Status};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub sequence: i32,
    pub status: Status,
    pub created_at: u64,
    pub updated_at: u64,
}

pub fn role_order(a: &Role, b: &Role) -> Ordering {
    b.sequence
        .cmp(&a.sequence)
        .then(b.created_at.cmp(&a.created_at))
        .then(b.id.cmp(&a.id))
}

/// A role together with its menu grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleWithMenus {
    #[serde(flatten)]
    pub role: Role,
    pub menus: Vec<RoleMenu>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RoleForm {
    #[validate(length(min = 1, max = 32, message = "code is required, at most 32 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 128, message = "name is required, at most 128 characters"))]
    pub name: String,
    #[validate(length(max = 1024))]
    pub description: String,
    pub sequence: i32,
    pub status: Status,
    /// Menu IDs granted to the role
    pub menus: Vec<u64>,
}

impl RoleForm {
    pub fn fill_to(&self, role: &mut Role) {
        role.code = self.code.clone();
        role.name = self.name.clone();
        role.description = self.description.clone();
        role.sequence = self.sequence;
        role.status = self.status;
    }

    pub fn menu_ids(&self) -> Vec<u64> {
        dedup_ids(&self.menus)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleFilter {
    pub name_contains: Option<String>,
    pub code: Option<String>,
    pub status: Option<Status>,
}

impl RoleFilter {
    pub(crate) fn matches(&self, r: &Role) -> bool {
        self.name_contains.as_ref().map_or(true, |v| r.name.contains(v.as_str()))
            && self.code.as_ref().map_or(true, |v| &r.code == v)
            && self.status.map_or(true, |v| r.status == v)
    }
}
