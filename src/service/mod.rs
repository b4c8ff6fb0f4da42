//! The engine's public operations.
//!
//! Each mutating call is one [`Storage::transact`]: validation, the row write
//! and its cascades all see and commit the same snapshot.

mod menu;
mod role;
mod user;

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::Config;
use crate::db::Storage;
use crate::error::{RbacError, Result};
use crate::schema::{Link, LinkFilter, Pagination};
use crate::store::{LinkStore, Record, RecordStore};
use crate::tx::Tx;

/// Menu/role/user RBAC engine over one storage environment
pub struct Rbac {
    storage: Storage,
}

impl Rbac {
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Rbac { storage: Storage::open(config)? })
    }

    pub fn new(storage: Storage) -> Self {
        Rbac { storage }
    }

    /// Direct access for callers composing their own transactions
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

/// Every referenced ID must exist in `table`
fn require_all<T: Record>(tx: &Tx, table: RecordStore<T>, ids: &[u64]) -> Result<()> {
    for &id in ids {
        if !table.exists(tx.ro(), id)? {
            return Err(RbacError::InvalidInput(format!("{} {id} not found", T::TABLE)));
        }
    }
    Ok(())
}

/// Make the join rows owned by `left` point at exactly `rights`.
///
/// Rows whose right key is kept are left untouched; the rest are deleted and
/// the missing ones created. Returns the resulting rows in ID order.
fn sync_links<L: Link>(tx: &mut Tx, store: LinkStore<L>, left: u64, rights: &[u64]) -> Result<Vec<L>> {
    let wanted: BTreeSet<u64> = rights.iter().copied().collect();
    let existing = store.query(tx.ro(), LinkFilter::left(left), Pagination::all())?.items;
    let mut have = BTreeSet::new();
    let mut removed = 0;
    for l in &existing {
        if wanted.contains(&l.right()) && have.insert(l.right()) {
            continue;
        }
        store.delete(tx.tx(), l.id())?;
        removed += 1;
    }
    let mut added = 0;
    for &right in rights {
        if !have.insert(right) {
            continue;
        }
        let mut l = L::new(left, right);
        l.set_id(tx.next_id(L::TABLE)?);
        l.set_created_at(tx.now());
        l.set_updated_at(tx.now());
        store.create(tx.tx(), &l)?;
        added += 1;
    }
    debug!(table = L::TABLE, left, added, removed, "links synced");
    Ok(store.query(tx.ro(), LinkFilter::left(left), Pagination::all())?.items)
}
