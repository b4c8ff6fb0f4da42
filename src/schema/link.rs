//! Many-to-many join entities with their own identity

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A join row `(id, left, right)`. The left key is the owning side
/// (`UserRole.user_id`, `RoleMenu.role_id`).
pub trait Link: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Base table name
    const TABLE: &'static str;

    fn new(left: u64, right: u64) -> Self;
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
    fn left(&self) -> u64;
    fn right(&self) -> u64;
    fn created_at(&self) -> u64;
    fn set_created_at(&mut self, at: u64);
    fn set_updated_at(&mut self, at: u64);
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRole {
    pub id: u64,
    pub user_id: u64,
    pub role_id: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleMenu {
    pub id: u64,
    pub role_id: u64,
    pub menu_id: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

macro_rules! impl_link {
    ($ty:ty, $table:literal, $left:ident, $right:ident) => {
        impl Link for $ty {
            const TABLE: &'static str = $table;

            fn new(left: u64, right: u64) -> Self {
                Self { $left: left, $right: right, ..Default::default() }
            }
            fn id(&self) -> u64 {
                self.id
            }
            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
            fn left(&self) -> u64 {
                self.$left
            }
            fn right(&self) -> u64 {
                self.$right
            }
            fn created_at(&self) -> u64 {
                self.created_at
            }
            fn set_created_at(&mut self, at: u64) {
                self.created_at = at;
            }
            fn set_updated_at(&mut self, at: u64) {
                self.updated_at = at;
            }
        }
    };
}

impl_link!(UserRole, "user_role", user_id, role_id);
impl_link!(RoleMenu, "role_menu", role_id, menu_id);

/// Exact-match filter on either foreign key
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkFilter {
    pub left: Option<u64>,
    pub right: Option<u64>,
}

impl LinkFilter {
    pub fn left(id: u64) -> Self {
        LinkFilter { left: Some(id), right: None }
    }

    pub fn right(id: u64) -> Self {
        LinkFilter { left: None, right: Some(id) }
    }

    pub(crate) fn matches<L: Link>(&self, l: &L) -> bool {
        self.left.map_or(true, |v| l.left() == v) && self.right.map_or(true, |v| l.right() == v)
    }
}
