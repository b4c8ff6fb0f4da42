//! Generic ID-keyed record table

use std::cmp::Ordering;
use std::marker::PhantomData;

use heed::{RoTxn, RwTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::Table;
use crate::error::{err, RbacError, Result};
use crate::schema::{Menu, MenuResource, Pagination, Page, Role, User};

/// A persisted entity with a numeric identity and timestamps
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
    fn created_at(&self) -> u64;
    fn set_created_at(&mut self, at: u64);
    fn set_updated_at(&mut self, at: u64);
}

macro_rules! impl_record {
    ($ty:ty, $table:literal) => {
        impl Record for $ty {
            const TABLE: &'static str = $table;

            fn id(&self) -> u64 {
                self.id
            }
            fn set_id(&mut self, id: u64) {
                self.id = id;
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

impl_record!(Menu, "menu");
impl_record!(MenuResource, "menu_resource");
impl_record!(Role, "role");
impl_record!(User, "user");

pub struct RecordStore<T> {
    rows: Table<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RecordStore<T> {}

impl<T: Record> RecordStore<T> {
    pub(crate) fn new(rows: Table<T>) -> Self {
        RecordStore { rows, _marker: PhantomData }
    }

    pub fn get(&self, tx: &RoTxn, id: u64) -> Result<Option<T>> {
        self.rows.get(tx, &id).map_err(err(T::TABLE))
    }

    /// Like [`get`](Self::get) but absence is `NotFound`
    pub fn fetch(&self, tx: &RoTxn, id: u64) -> Result<T> {
        self.get(tx, id)?.ok_or_else(|| RbacError::not_found(T::TABLE, id))
    }

    pub fn exists(&self, tx: &RoTxn, id: u64) -> Result<bool> {
        Ok(self.get(tx, id)?.is_some())
    }

    /// Write a new row; the ID must already be assigned
    pub fn create(&self, tx: &mut RwTxn, item: &T) -> Result<()> {
        self.rows.put(tx, &item.id(), item).map_err(err(T::TABLE))
    }

    /// Full replace of every field except `created_at`
    pub fn update(&self, tx: &mut RwTxn, item: &T) -> Result<T> {
        let old = self.fetch(tx, item.id())?;
        let mut item = item.clone();
        item.set_created_at(old.created_at());
        self.rows.put(tx, &item.id(), &item).map_err(err(T::TABLE))?;
        Ok(item)
    }

    pub fn delete(&self, tx: &mut RwTxn, id: u64) -> Result<bool> {
        self.rows.delete(tx, &id).map_err(err(T::TABLE))
    }

    /// Every row accepted by `keep`, in table (ID) order
    pub fn scan(&self, tx: &RoTxn, mut keep: impl FnMut(&T) -> bool) -> Result<Vec<T>> {
        let mut r = Vec::new();
        for item in self.rows.iter(tx).map_err(err(T::TABLE))? {
            let (_, row) = item.map_err(err(T::TABLE))?;
            if keep(&row) {
                r.push(row);
            }
        }
        Ok(r)
    }

    /// Rows for the given IDs that exist, in the order given
    pub fn get_many(&self, tx: &RoTxn, ids: impl IntoIterator<Item = u64>) -> Result<Vec<T>> {
        let mut r = Vec::new();
        for id in ids {
            if let Some(row) = self.get(tx, id)? {
                r.push(row);
            }
        }
        Ok(r)
    }

    pub fn query(
        &self,
        tx: &RoTxn,
        keep: impl FnMut(&T) -> bool,
        order: impl FnMut(&T, &T) -> Ordering,
        pagination: Pagination,
    ) -> Result<Page<T>> {
        let mut rows = self.scan(tx, keep)?;
        rows.sort_by(order);
        Ok(pagination.apply(rows))
    }
}
