//! Records, forms and filters

mod link;
mod menu;
mod role;
mod user;

pub use link::{Link, LinkFilter, RoleMenu, UserRole};
pub use menu::{menu_order, Menu, MenuFilter, MenuForm, MenuNode, MenuResource, MenuResourceForm, MenuType};
pub use role::{role_order, Role, RoleFilter, RoleForm, RoleWithMenus};
pub use user::{user_order, User, UserFilter, UserForm, UserStatus, UserWithRoles};

use serde::{Deserialize, Deserializer, Serialize};

/// Status shared by menus and roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Enabled,
    Disabled,
}

/// 1-based page selection; `page_size == 0` means everything
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn all() -> Self {
        Pagination::default()
    }

    pub fn new(page: usize, page_size: usize) -> Self {
        Pagination { page, page_size }
    }

    /// Cut one page out of an already sorted list
    pub(crate) fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        if self.page_size == 0 {
            return Page { items, total };
        }
        let skip = self.page.max(1).saturating_sub(1).saturating_mul(self.page_size);
        let items = items.into_iter().skip(skip).take(self.page_size).collect();
        Page { items, total }
    }
}

/// One page of results plus the count of all matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Blank optional strings arrive as `None` so format checks only see real values
pub(crate) fn blank_as_none<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<String>, D::Error> {
    let v = Option::<String>::deserialize(de)?;
    Ok(v.filter(|s| !s.is_empty()))
}

/// Drop repeated IDs, keeping first occurrences in order
pub(crate) fn dedup_ids(ids: &[u64]) -> Vec<u64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_slices_and_counts() {
        let p = Pagination::new(2, 2).apply((1..=5).collect::<Vec<_>>());
        assert_eq!(p.items, vec![3, 4]);
        assert_eq!(p.total, 5);
        let p = Pagination::all().apply(vec![1, 2, 3]);
        assert_eq!(p.items.len(), 3);
        let p = Pagination::new(9, 2).apply(vec![1, 2, 3]);
        assert!(p.items.is_empty());
        assert_eq!(p.total, 3);
    }
}
