//! Menu records, forms and query filters

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuType {
    #[default]
    Page,
    Button,
}

/// One node of the navigable permission hierarchy, as stored
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Menu {
    pub id: u64,
    /// Unique among siblings
    pub code: String,
    /// Unique among siblings
    pub name: String,
    pub description: String,
    /// Sort key, descending
    pub sequence: i32,
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    /// Navigable path, opaque to the engine
    pub path: String,
    /// Free-form JSON
    pub properties: String,
    pub status: Status,
    /// 0 for roots
    pub parent_id: u64,
    /// Ancestor chain excluding self, see [`crate::path`]
    pub parent_path: String,
    pub created_at: u64,
    pub updated_at: u64,
    /// Attached on read, never stored in the menu row
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<MenuResource>,
}

impl Menu {
    pub fn is_root(&self) -> bool {
        self.parent_id == 0
    }

    /// Path carried by this menu's children; prefix of every descendant's `parent_path`
    pub fn own_path(&self) -> String {
        crate::path::child_path(&self.parent_path, self.id)
    }
}

/// Sequence descending, then newest first, then highest ID first
pub fn menu_order(a: &Menu, b: &Menu) -> Ordering {
    b.sequence
        .cmp(&a.sequence)
        .then(b.created_at.cmp(&a.created_at))
        .then(b.id.cmp(&a.id))
}

/// A menu with its children, produced by [`crate::tree::build_tree`] and never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub menu: Menu,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

/// An API endpoint guarded by a menu; `(method, path)` is unique per menu
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MenuResource {
    pub id: u64,
    pub menu_id: u64,
    pub method: String,
    pub path: String,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
pub struct MenuResourceForm {
    #[validate(length(min = 1, max = 20, message = "method is required, at most 20 characters"))]
    pub method: String,
    #[validate(length(min = 1, max = 255, message = "path is required, at most 255 characters"))]
    pub path: String,
}

impl From<&MenuResource> for MenuResourceForm {
    fn from(r: &MenuResource) -> Self {
        MenuResourceForm { method: r.method.clone(), path: r.path.clone() }
    }
}

fn properties_json(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || serde_json::from_str::<serde_json::Value>(value).is_ok() {
        return Ok(());
    }
    Err(ValidationError::new("json").with_message("invalid properties".into()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MenuForm {
    #[validate(length(min = 1, max = 32, message = "code is required, at most 32 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 128, message = "name is required, at most 128 characters"))]
    pub name: String,
    pub description: String,
    pub sequence: i32,
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    pub path: String,
    #[validate(custom(function = "properties_json"))]
    pub properties: String,
    #[validate(required(message = "status is required"))]
    pub status: Option<Status>,
    pub parent_id: u64,
    /// Replaces the menu's resource list on create and update
    #[validate(nested)]
    pub resources: Vec<MenuResourceForm>,
}

impl MenuForm {
    /// Overwrite every form-controlled field of `menu`
    pub fn fill_to(&self, menu: &mut Menu) {
        menu.code = self.code.clone();
        menu.name = self.name.clone();
        menu.description = self.description.clone();
        menu.sequence = self.sequence;
        menu.menu_type = self.menu_type;
        menu.path = self.path.clone();
        menu.properties = self.properties.clone();
        menu.status = self.status.unwrap_or_default();
        menu.parent_id = self.parent_id;
    }

    /// Resource entries with repeats dropped, first occurrence kept
    pub fn resource_forms(&self) -> Vec<MenuResourceForm> {
        let mut r: Vec<MenuResourceForm> = Vec::with_capacity(self.resources.len());
        for f in &self.resources {
            if !r.contains(f) {
                r.push(f.clone());
            }
        }
        r
    }
}

impl From<&Menu> for MenuForm {
    fn from(m: &Menu) -> Self {
        MenuForm {
            code: m.code.clone(),
            name: m.name.clone(),
            description: m.description.clone(),
            sequence: m.sequence,
            menu_type: m.menu_type,
            path: m.path.clone(),
            properties: m.properties.clone(),
            status: Some(m.status),
            parent_id: m.parent_id,
            resources: m.resources.iter().map(MenuResourceForm::from).collect(),
        }
    }
}

/// Menu query filter. Every set field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuFilter {
    pub in_ids: Option<Vec<u64>>,
    /// Case-sensitive substring of `name`
    pub name_contains: Option<String>,
    pub status: Option<Status>,
    pub parent_id: Option<u64>,
    /// Ignored when it denotes the root
    pub parent_path_prefix: Option<String>,
    pub code: Option<String>,
    /// Chain of codes from the root, e.g. `system.menu`; restricts to that subtree
    pub code_path: Option<String>,
    /// Only menus reachable by this user through its roles
    pub user_id: Option<u64>,
    /// Only menus granted to this role
    pub role_id: Option<u64>,
    /// Attach each result's resources
    pub include_resources: bool,
}

impl MenuFilter {
    pub fn enabled() -> Self {
        MenuFilter {
            status: Some(Status::Enabled),
            ..Default::default()
        }
    }

    /// Plain column predicates; ID-set and path predicates are applied by the store
    pub(crate) fn matches_columns(&self, m: &Menu) -> bool {
        if let Some(v) = &self.name_contains {
            if !m.name.contains(v.as_str()) {
                return false;
            }
        }
        if let Some(v) = self.status {
            if m.status != v {
                return false;
            }
        }
        if let Some(v) = self.parent_id {
            if m.parent_id != v {
                return false;
            }
        }
        if let Some(v) = &self.code {
            if &m.code != v {
                return false;
            }
        }
        true
    }

    /// Effective parent-path prefix, with the root sentinel guarded out
    pub(crate) fn path_prefix(&self) -> Option<&str> {
        self.parent_path_prefix
            .as_deref()
            .filter(|p| !crate::path::is_root_prefix(p))
    }
}
