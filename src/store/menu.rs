//! Menu table with its parent-ID and materialized-path indexes

use std::collections::BTreeSet;

use heed::{RoTxn, RwTxn};

use super::RecordStore;
use crate::db::{key, split_key, Db, DbStr};
use crate::error::{err, Result};
use crate::path;
use crate::schema::{menu_order, Menu, MenuFilter, Page, Pagination, Status};

/// Key in the path index: the parent path, a separator, then the menu ID
fn path_key(parent_path: &str, id: u64) -> String {
    format!("{parent_path}|{id}")
}

/// The row as persisted; resources live in their own table
fn stored(m: &Menu) -> Menu {
    Menu { resources: Vec::new(), ..m.clone() }
}

#[derive(Clone, Copy)]
pub struct MenuStore {
    pub(crate) rows: RecordStore<Menu>,
    /// (parent_id, id) -> id
    pub(crate) by_parent: Db,
    /// "parent_path|id" -> id
    pub(crate) by_path: DbStr,
}

impl MenuStore {
    pub fn get(&self, tx: &RoTxn, id: u64) -> Result<Option<Menu>> {
        self.rows.get(tx, id)
    }

    pub fn fetch(&self, tx: &RoTxn, id: u64) -> Result<Menu> {
        self.rows.fetch(tx, id)
    }

    pub fn exists(&self, tx: &RoTxn, id: u64) -> Result<bool> {
        self.rows.exists(tx, id)
    }

    pub fn get_many(&self, tx: &RoTxn, ids: impl IntoIterator<Item = u64>) -> Result<Vec<Menu>> {
        self.rows.get_many(tx, ids)
    }

    /// Direct children IDs in ID order
    pub fn child_ids(&self, tx: &RoTxn, parent_id: u64) -> Result<Vec<u64>> {
        let mut r = Vec::new();
        for item in self
            .by_parent
            .prefix_iter(tx, &parent_id.to_be_bytes())
            .map_err(err("menu.children"))?
        {
            let (k, v) = item.map_err(err("menu.children"))?;
            if split_key(k).is_some() {
                r.push(v);
            }
        }
        Ok(r)
    }

    pub fn has_children(&self, tx: &RoTxn, parent_id: u64) -> Result<bool> {
        let mut it = self
            .by_parent
            .prefix_iter(tx, &parent_id.to_be_bytes())
            .map_err(err("menu.children"))?;
        Ok(it.next().transpose().map_err(err("menu.children"))?.is_some())
    }

    fn find_child(&self, tx: &RoTxn, parent_id: u64, pred: impl Fn(&Menu) -> bool) -> Result<Option<Menu>> {
        for id in self.child_ids(tx, parent_id)? {
            if let Some(m) = self.get(tx, id)? {
                if pred(&m) {
                    return Ok(Some(m));
                }
            }
        }
        Ok(None)
    }

    pub fn get_by_code_and_parent(&self, tx: &RoTxn, code: &str, parent_id: u64) -> Result<Option<Menu>> {
        self.find_child(tx, parent_id, |m| m.code == code)
    }

    pub fn get_by_name_and_parent(&self, tx: &RoTxn, name: &str, parent_id: u64) -> Result<Option<Menu>> {
        self.find_child(tx, parent_id, |m| m.name == name)
    }

    pub fn exists_code_under_parent(&self, tx: &RoTxn, code: &str, parent_id: u64) -> Result<bool> {
        Ok(self.get_by_code_and_parent(tx, code, parent_id)?.is_some())
    }

    pub fn exists_name_under_parent(&self, tx: &RoTxn, name: &str, parent_id: u64) -> Result<bool> {
        Ok(self.get_by_name_and_parent(tx, name, parent_id)?.is_some())
    }

    /// IDs of every menu whose parent path starts with `prefix`. A root prefix yields nothing.
    pub fn ids_with_path_prefix(&self, tx: &RoTxn, prefix: &str) -> Result<Vec<u64>> {
        if path::is_root_prefix(prefix) {
            return Ok(Vec::new());
        }
        let mut r = Vec::new();
        for item in self.by_path.prefix_iter(tx, prefix).map_err(err("menu.path_scan"))? {
            let (k, id) = item.map_err(err("menu.path_scan"))?;
            // A prefix reaching past the separator would match on the ID part
            if k.rsplit_once('|').is_some_and(|(parent_path, _)| parent_path.starts_with(prefix)) {
                r.push(id);
            }
        }
        Ok(r)
    }

    fn put_indexes(&self, tx: &mut RwTxn, m: &Menu) -> Result<()> {
        self.by_parent
            .put(tx, &key(m.parent_id, m.id), &m.id)
            .map_err(err("menu.index"))?;
        self.by_path
            .put(tx, &path_key(&m.parent_path, m.id), &m.id)
            .map_err(err("menu.index"))
    }

    fn del_indexes(&self, tx: &mut RwTxn, m: &Menu) -> Result<()> {
        self.by_parent
            .delete(tx, &key(m.parent_id, m.id))
            .map_err(err("menu.index"))?;
        self.by_path
            .delete(tx, &path_key(&m.parent_path, m.id))
            .map_err(err("menu.index"))?;
        Ok(())
    }

    pub fn create(&self, tx: &mut RwTxn, m: &Menu) -> Result<()> {
        self.rows.create(tx, &stored(m))?;
        self.put_indexes(tx, m)
    }

    /// Full replace, preserving `created_at`; indexes follow the new parent and path
    pub fn update(&self, tx: &mut RwTxn, m: &Menu) -> Result<Menu> {
        let old = self.fetch(tx, m.id)?;
        self.del_indexes(tx, &old)?;
        let m = self.rows.update(tx, &stored(m))?;
        self.put_indexes(tx, &m)?;
        Ok(m)
    }

    pub fn delete(&self, tx: &mut RwTxn, id: u64) -> Result<bool> {
        match self.get(tx, id)? {
            Some(old) => {
                self.del_indexes(tx, &old)?;
                self.rows.delete(tx, id)
            }
            None => Ok(false),
        }
    }

    pub fn update_parent_path(&self, tx: &mut RwTxn, id: u64, parent_path: &str, now: u64) -> Result<()> {
        let mut m = self.fetch(tx, id)?;
        self.by_path
            .delete(tx, &path_key(&m.parent_path, id))
            .map_err(err("menu.index"))?;
        m.parent_path = parent_path.to_string();
        m.updated_at = now;
        self.rows.update(tx, &m)?;
        self.by_path
            .put(tx, &path_key(parent_path, id), &id)
            .map_err(err("menu.index"))
    }

    /// Set `status` on every menu whose parent path starts with `prefix`.
    /// Returns the number of rows changed; a root prefix changes nothing.
    pub fn update_status_by_parent_path_prefix(
        &self,
        tx: &mut RwTxn,
        prefix: &str,
        status: Status,
        now: u64,
    ) -> Result<usize> {
        let mut n = 0;
        for id in self.ids_with_path_prefix(tx, prefix)? {
            let mut m = self.fetch(tx, id)?;
            if m.parent_path.starts_with(prefix) && m.status != status {
                m.status = status;
                m.updated_at = now;
                self.rows.update(tx, &m)?;
                n += 1;
            }
        }
        Ok(n)
    }

    /// Filtered, sorted page. `allowed` restricts to an ID set computed by the caller
    /// (explicit IDs, user/role reachability, code-path subtree).
    pub fn query(
        &self,
        tx: &RoTxn,
        filter: &MenuFilter,
        allowed: Option<&BTreeSet<u64>>,
        pagination: Pagination,
    ) -> Result<Page<Menu>> {
        let prefix = filter.path_prefix();
        let mut rows = match (allowed, prefix, filter.parent_id) {
            (Some(ids), _, _) => self.get_many(tx, ids.iter().copied())?,
            (None, Some(p), _) => self.get_many(tx, self.ids_with_path_prefix(tx, p)?)?,
            (None, None, Some(pid)) => self.get_many(tx, self.child_ids(tx, pid)?)?,
            (None, None, None) => self.rows.scan(tx, |_| true)?,
        };
        rows.retain(|m| {
            filter.matches_columns(m) && prefix.map_or(true, |p| m.parent_path.starts_with(p))
        });
        rows.sort_by(menu_order);
        Ok(pagination.apply(rows))
    }
}
