//! Menu resources keyed by owning menu

use heed::{RoTxn, RwTxn};

use super::RecordStore;
use crate::db::{key, split_key, Db};
use crate::error::{err, Result};
use crate::schema::MenuResource;

#[derive(Clone, Copy)]
pub struct ResourceStore {
    pub(crate) rows: RecordStore<MenuResource>,
    /// (menu_id, id) -> id
    pub(crate) by_menu: Db,
}

impl ResourceStore {
    pub fn get(&self, tx: &RoTxn, id: u64) -> Result<Option<MenuResource>> {
        self.rows.get(tx, id)
    }

    fn ids_for_menu(&self, tx: &RoTxn, menu_id: u64) -> Result<Vec<u64>> {
        let mut r = Vec::new();
        for item in self
            .by_menu
            .prefix_iter(tx, &menu_id.to_be_bytes())
            .map_err(err("menu_resource.scan"))?
        {
            let (k, v) = item.map_err(err("menu_resource.scan"))?;
            if split_key(k).is_some() {
                r.push(v);
            }
        }
        Ok(r)
    }

    /// Every resource of one menu, in ID order
    pub fn list_for_menu(&self, tx: &RoTxn, menu_id: u64) -> Result<Vec<MenuResource>> {
        self.rows.get_many(tx, self.ids_for_menu(tx, menu_id)?)
    }

    pub fn create(&self, tx: &mut RwTxn, r: &MenuResource) -> Result<()> {
        self.rows.create(tx, r)?;
        self.by_menu
            .put(tx, &key(r.menu_id, r.id), &r.id)
            .map_err(err("menu_resource.index"))
    }

    pub fn delete(&self, tx: &mut RwTxn, id: u64) -> Result<bool> {
        match self.get(tx, id)? {
            Some(old) => {
                self.by_menu
                    .delete(tx, &key(old.menu_id, id))
                    .map_err(err("menu_resource.index"))?;
                self.rows.delete(tx, id)
            }
            None => Ok(false),
        }
    }

    /// Drop every resource of a menu; returns how many went
    pub fn delete_by_menu(&self, tx: &mut RwTxn, menu_id: u64) -> Result<usize> {
        let ids = self.ids_for_menu(tx, menu_id)?;
        for &id in &ids {
            self.by_menu
                .delete(tx, &key(menu_id, id))
                .map_err(err("menu_resource.index"))?;
            self.rows.delete(tx, id)?;
        }
        Ok(ids.len())
    }
}
