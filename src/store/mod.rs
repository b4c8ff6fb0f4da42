//! Tables: menus and their resources, roles, users and the two join tables

mod link;
mod menu;
mod record;
mod resource;

pub use link::LinkStore;
pub use menu::MenuStore;
pub use record::{Record, RecordStore};
pub use resource::ResourceStore;

use std::collections::BTreeSet;

use heed::RoTxn;

use crate::db::Dbs;
use crate::error::Result;
use crate::path::DELIMITER;
use crate::resolve;
use crate::schema::{Menu, MenuFilter, Page, Pagination};

fn restrict(allowed: &mut Option<BTreeSet<u64>>, ids: BTreeSet<u64>) {
    *allowed = Some(match allowed.take() {
        Some(prev) => prev.intersection(&ids).copied().collect(),
        None => ids,
    });
}

impl Dbs {
    /// Menu query with every filter applied, including the ones that go
    /// through the join tables (user, role) or the code hierarchy.
    pub fn query_menus(&self, tx: &RoTxn, filter: &MenuFilter, pagination: Pagination) -> Result<Page<Menu>> {
        let mut allowed = None;
        if let Some(ids) = &filter.in_ids {
            restrict(&mut allowed, ids.iter().copied().collect());
        }
        if let Some(user_id) = filter.user_id {
            restrict(&mut allowed, resolve::menu_ids_for_user(self, tx, user_id)?);
        }
        if let Some(role_id) = filter.role_id {
            restrict(&mut allowed, resolve::menu_ids_for_role(self, tx, role_id)?);
        }
        if let Some(code_path) = &filter.code_path {
            restrict(&mut allowed, self.subtree_by_code_path(tx, code_path)?);
        }
        let mut page = self.menus.query(tx, filter, allowed.as_ref(), pagination)?;
        if filter.include_resources {
            for m in &mut page.items {
                m.resources = self.resources.list_for_menu(tx, m.id)?;
            }
        }
        Ok(page)
    }

    /// Walk `a.b.c` down from the roots by code; the menu found plus all its descendants.
    /// Empty when any step is missing.
    pub fn subtree_by_code_path(&self, tx: &RoTxn, code_path: &str) -> Result<BTreeSet<u64>> {
        let mut found: Option<Menu> = None;
        for code in code_path.split(DELIMITER).filter(|c| !c.is_empty()) {
            let parent_id = found.as_ref().map_or(0, |m| m.id);
            match self.menus.get_by_code_and_parent(tx, code, parent_id)? {
                Some(m) => found = Some(m),
                None => return Ok(BTreeSet::new()),
            }
        }
        let Some(menu) = found else {
            return Ok(BTreeSet::new());
        };
        let mut ids: BTreeSet<u64> = self.menus.ids_with_path_prefix(tx, &menu.own_path())?.into_iter().collect();
        ids.insert(menu.id);
        Ok(ids)
    }
}
