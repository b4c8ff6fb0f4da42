//! Join-table manager shared by UserRole and RoleMenu

use std::collections::BTreeSet;

use heed::{RoTxn, RwTxn};

use crate::db::{BiPair, Table};
use crate::error::{err, RbacError, Result};
use crate::schema::{Link, LinkFilter, Page, Pagination};

pub struct LinkStore<L> {
    rows: Table<L>,
    pair: BiPair,
}

impl<L> Clone for LinkStore<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for LinkStore<L> {}

impl<L: Link> LinkStore<L> {
    pub(crate) fn new(rows: Table<L>, pair: BiPair) -> Self {
        LinkStore { rows, pair }
    }

    pub fn get(&self, tx: &RoTxn, id: u64) -> Result<Option<L>> {
        self.rows.get(tx, &id).map_err(err(L::TABLE))
    }

    pub fn exists(&self, tx: &RoTxn, id: u64) -> Result<bool> {
        Ok(self.get(tx, id)?.is_some())
    }

    pub fn query(&self, tx: &RoTxn, filter: LinkFilter, pagination: Pagination) -> Result<Page<L>> {
        let ids: Vec<u64> = match (filter.left, filter.right) {
            (Some(left), _) => self.pair.list_fwd(tx, left)?.into_iter().map(|(id, _)| id).collect(),
            (None, Some(right)) => self.pair.list_rev(tx, right)?.into_iter().map(|(id, _)| id).collect(),
            (None, None) => {
                let mut r = Vec::new();
                for item in self.rows.iter(tx).map_err(err(L::TABLE))? {
                    r.push(item.map_err(err(L::TABLE))?.0);
                }
                r
            }
        };
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(l) = self.get(tx, id)? {
                if filter.matches(&l) {
                    rows.push(l);
                }
            }
        }
        rows.sort_by_key(|l| l.id());
        Ok(pagination.apply(rows))
    }

    /// Distinct right keys linked to `left`
    pub fn rights_of(&self, tx: &RoTxn, left: u64) -> Result<BTreeSet<u64>> {
        Ok(self.pair.list_fwd(tx, left)?.into_iter().map(|(_, r)| r).collect())
    }

    /// Distinct right keys linked to any of `lefts`
    pub fn rights_of_any(&self, tx: &RoTxn, lefts: &BTreeSet<u64>) -> Result<BTreeSet<u64>> {
        let mut r = BTreeSet::new();
        for &left in lefts {
            r.extend(self.pair.list_fwd(tx, left)?.into_iter().map(|(_, right)| right));
        }
        Ok(r)
    }

    /// Write a new row; the ID must already be assigned
    pub fn create(&self, tx: &mut RwTxn, link: &L) -> Result<()> {
        self.rows.put(tx, &link.id(), link).map_err(err(L::TABLE))?;
        self.pair.put(tx, link.left(), link.id(), link.right())
    }

    /// Full replace; both indexes move with the keys
    pub fn update(&self, tx: &mut RwTxn, link: &L) -> Result<()> {
        let old = self
            .get(tx, link.id())?
            .ok_or_else(|| RbacError::not_found(L::TABLE, link.id()))?;
        self.pair.del(tx, old.left(), old.id(), old.right())?;
        let mut link = link.clone();
        link.set_created_at(old.created_at());
        self.rows.put(tx, &link.id(), &link).map_err(err(L::TABLE))?;
        self.pair.put(tx, link.left(), link.id(), link.right())
    }

    pub fn delete(&self, tx: &mut RwTxn, id: u64) -> Result<bool> {
        match self.get(tx, id)? {
            Some(old) => {
                self.pair.del(tx, old.left(), id, old.right())?;
                self.rows.delete(tx, &id).map_err(err(L::TABLE))
            }
            None => Ok(false),
        }
    }

    /// Delete every row with this left key; returns how many went
    pub fn delete_by_left(&self, tx: &mut RwTxn, left: u64) -> Result<usize> {
        let rows = self.pair.list_fwd(tx, left)?;
        for &(id, right) in &rows {
            self.pair.del(tx, left, id, right)?;
            self.rows.delete(tx, &id).map_err(err(L::TABLE))?;
        }
        Ok(rows.len())
    }

    /// Delete every row with this right key; returns how many went
    pub fn delete_by_right(&self, tx: &mut RwTxn, right: u64) -> Result<usize> {
        let rows = self.pair.list_rev(tx, right)?;
        for &(id, left) in &rows {
            self.pair.del(tx, left, id, right)?;
            self.rows.delete(tx, &id).map_err(err(L::TABLE))?;
        }
        Ok(rows.len())
    }
}
