//! Write transactions.
//!
//! Every mutating operation runs inside one LMDB write transaction. LMDB admits
//! a single writer at a time, so two operations touching overlapping subtrees
//! are serialized, and readers keep seeing their snapshot until commit.

use heed::{RoTxn, RwTxn};

use crate::db::{now_millis, Dbs, Storage};
use crate::error::{err, Result};

/// Transaction wrapper handed to mutating code
pub struct Tx<'e> {
    txn: RwTxn<'e>,
    dbs: &'e Dbs,
    now: u64,
}

impl<'e> Tx<'e> {
    #[inline]
    pub fn tx(&mut self) -> &mut RwTxn<'e> {
        &mut self.txn
    }

    #[inline]
    pub fn ro(&self) -> &RoTxn<'e> {
        &self.txn
    }

    #[inline]
    pub fn dbs(&self) -> &'e Dbs {
        self.dbs
    }

    /// Timestamp shared by every row this transaction touches
    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn next_id(&mut self, table: &str) -> Result<u64> {
        let seq = self.dbs.seq;
        seq.next_id(&mut self.txn, table)
    }

    fn commit(self) -> Result<()> {
        self.txn.commit().map_err(err("commit"))
    }
}

impl Storage {
    /// Run `f` in a single write transaction; any error aborts everything it wrote
    pub fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx {
            txn: self.env.write_txn().map_err(err("write_txn"))?,
            dbs: &self.dbs,
            now: now_millis(),
        };
        let r = f(&mut tx)?;
        tx.commit()?;
        Ok(r)
    }
}
