use std::collections::BTreeSet;

use heed::RoTxn;
use tracing::{debug, info};
use validator::Validate;

use super::Rbac;
use crate::cascade::{self, Cascade};
use crate::db::Dbs;
use crate::error::{RbacError, Result};
use crate::schema::{
    menu_order, Menu, MenuFilter, MenuForm, MenuNode, MenuResource, MenuResourceForm, Page, Pagination,
};
use crate::store::Record;
use crate::tree;
use crate::tx::Tx;

impl Rbac {
    /// One menu with its resources attached
    pub fn get_menu(&self, id: u64) -> Result<Menu> {
        self.storage.read(|d, tx| {
            let mut m = d.menus.fetch(tx, id)?;
            m.resources = d.resources.list_for_menu(tx, id)?;
            Ok(m)
        })
    }

    pub fn query_menus(&self, filter: &MenuFilter, pagination: Pagination) -> Result<Page<Menu>> {
        self.storage.read(|d, tx| d.query_menus(tx, filter, pagination))
    }

    /// Matching menus as a forest. Ancestors missing from the match are pulled
    /// in so nothing that matched is lost to orphan dropping.
    pub fn menu_tree(&self, filter: &MenuFilter) -> Result<Vec<MenuNode>> {
        self.storage.read(|d, tx| {
            let menus = d.query_menus(tx, filter, Pagination::all())?.items;
            Ok(tree::build_tree(with_ancestors(d, tx, menus, filter)?))
        })
    }

    pub fn create_menu(&self, form: &MenuForm) -> Result<Menu> {
        form.validate()?;
        self.storage.transact(|tx| {
            let parent_path = cascade::parent_path_for(tx, form.parent_id)?;
            check_siblings(tx, form, None)?;
            let mut m = Menu::default();
            form.fill_to(&mut m);
            m.id = tx.next_id(Menu::TABLE)?;
            m.parent_path = parent_path;
            m.created_at = tx.now();
            m.updated_at = tx.now();
            tx.dbs().menus.create(tx.tx(), &m)?;
            m.resources = sync_resources(tx, m.id, &form.resource_forms())?;
            info!(id = m.id, code = %m.code, parent_id = m.parent_id, "menu created");
            Ok(m)
        })
    }

    /// Replace a menu's fields. A parent change moves the whole subtree; a
    /// change to disabled disables it.
    pub fn update_menu(&self, id: u64, form: &MenuForm) -> Result<Menu> {
        form.validate()?;
        self.storage.transact(|tx| {
            let d = tx.dbs();
            let old = d.menus.fetch(tx.ro(), id)?;
            if form.parent_id == id {
                return Err(RbacError::InvalidInput("menu cannot be its own parent".into()));
            }
            let mut parent_path = old.parent_path.clone();
            if form.parent_id != old.parent_id {
                parent_path = cascade::parent_path_for(tx, form.parent_id)?;
                if parent_path.starts_with(&old.own_path()) {
                    return Err(RbacError::InvalidInput("menu cannot move under its own descendant".into()));
                }
            }
            check_siblings(tx, form, Some(id))?;

            let mut m = old.clone();
            form.fill_to(&mut m);
            m.parent_path = parent_path;
            m.updated_at = tx.now();
            let mut m = d.menus.update(tx.tx(), &m)?;
            m.resources = sync_resources(tx, id, &form.resource_forms())?;

            if m.parent_path != old.parent_path {
                cascade::apply(
                    tx,
                    &Cascade::MenuMoved {
                        id,
                        old_own_path: old.own_path(),
                        new_own_path: m.own_path(),
                    },
                )?;
            }
            if m.status != old.status {
                cascade::apply(
                    tx,
                    &Cascade::MenuStatusChanged {
                        id,
                        own_path: m.own_path(),
                        status: m.status,
                    },
                )?;
            }
            info!(id, "menu updated");
            Ok(m)
        })
    }

    /// Remove a leaf menu with its resources and role grants. Menus with children stay.
    pub fn delete_menu(&self, id: u64) -> Result<()> {
        self.storage.transact(|tx| {
            let d = tx.dbs();
            d.menus.fetch(tx.ro(), id)?;
            if d.menus.has_children(tx.ro(), id)? {
                return Err(RbacError::PreconditionFailed(format!("menu {id} has children")));
            }
            d.menus.delete(tx.tx(), id)?;
            cascade::apply(tx, &Cascade::MenuDeleted { id })?;
            Ok(())
        })
    }
}

/// Code and name are each unique among one parent's children
fn check_siblings(tx: &Tx, form: &MenuForm, this: Option<u64>) -> Result<()> {
    let d = tx.dbs();
    let other = |m: Option<Menu>| m.is_some_and(|m| Some(m.id) != this);
    if other(d.menus.get_by_code_and_parent(tx.ro(), &form.code, form.parent_id)?) {
        return Err(RbacError::Conflict(format!("menu code {} already exists", form.code)));
    }
    if other(d.menus.get_by_name_and_parent(tx.ro(), &form.name, form.parent_id)?) {
        return Err(RbacError::Conflict(format!("menu name {} already exists", form.name)));
    }
    Ok(())
}

/// Make the menu's resources exactly `forms`. Rows matching a wanted
/// `(method, path)` are kept as they are; the rest are replaced.
fn sync_resources(tx: &mut Tx, menu_id: u64, forms: &[MenuResourceForm]) -> Result<Vec<MenuResource>> {
    let d = tx.dbs();
    let mut kept: Vec<MenuResourceForm> = Vec::new();
    let mut removed = 0;
    for r in d.resources.list_for_menu(tx.ro(), menu_id)? {
        let f = MenuResourceForm::from(&r);
        if forms.contains(&f) && !kept.contains(&f) {
            kept.push(f);
            continue;
        }
        d.resources.delete(tx.tx(), r.id)?;
        removed += 1;
    }
    let mut added = 0;
    for f in forms.iter().filter(|f| !kept.contains(f)) {
        let r = MenuResource {
            id: tx.next_id(MenuResource::TABLE)?,
            menu_id,
            method: f.method.clone(),
            path: f.path.clone(),
            created_at: tx.now(),
            updated_at: tx.now(),
        };
        d.resources.create(tx.tx(), &r)?;
        added += 1;
    }
    debug!(menu_id, added, removed, "menu resources synced");
    d.resources.list_for_menu(tx.ro(), menu_id)
}

/// `menus` plus every ancestor they lack, re-sorted into display order.
/// Fetched ancestors honour the filter's status so a disabled branch stays hidden.
pub(crate) fn with_ancestors(d: &Dbs, tx: &RoTxn, mut menus: Vec<Menu>, filter: &MenuFilter) -> Result<Vec<Menu>> {
    let missing: BTreeSet<u64> = tree::missing_ancestor_ids(&menus);
    if missing.is_empty() {
        return Ok(menus);
    }
    let mut ancestors = d.menus.get_many(tx, missing)?;
    ancestors.retain(|m| filter.status.map_or(true, |s| m.status == s));
    if filter.include_resources {
        for m in &mut ancestors {
            m.resources = d.resources.list_for_menu(tx, m.id)?;
        }
    }
    menus.extend(ancestors);
    menus.sort_by(menu_order);
    Ok(menus)
}
