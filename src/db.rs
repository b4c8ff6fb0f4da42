//! LMDB environment, table handles and index helpers

use std::path::Path;

use byteorder::BigEndian;
use heed::types::{Bytes, SerdeJson, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::info;

use crate::config::Config;
use crate::error::{err, Result};
use crate::schema::{Role, RoleMenu, User, UserRole};
use crate::store::{LinkStore, MenuStore, RecordStore, ResourceStore};

// Database type aliases
pub type Db = Database<Bytes, U64<BigEndian>>;
pub type DbStr = Database<Str, U64<BigEndian>>;
pub type Table<T> = Database<U64<BigEndian>, SerdeJson<T>>;

const MAX_DBS: u32 = 14;

/// Create a 16-byte key from two u64 values
#[inline]
pub fn key(a: u64, b: u64) -> [u8; 16] {
    let a = a.to_be_bytes();
    let b = b.to_be_bytes();
    [a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7],
     b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]
}

/// Inverse of [`key`]
#[inline]
pub fn split_key(k: &[u8]) -> Option<(u64, u64)> {
    let a: [u8; 8] = k.get(..8)?.try_into().ok()?;
    let b: [u8; 8] = k.get(8..16)?.try_into().ok()?;
    Some((u64::from_be_bytes(a), u64::from_be_bytes(b)))
}

/// Bidirectional join index: fwd[left, id] = right and rev[right, id] = left stay in sync
#[derive(Clone, Copy)]
pub struct BiPair {
    pub fwd: Db,
    pub rev: Db,
}

impl BiPair {
    #[inline]
    pub fn put(&self, tx: &mut RwTxn, left: u64, id: u64, right: u64) -> Result<()> {
        self.fwd.put(tx, &key(left, id), &right).map_err(err("index.put"))?;
        self.rev.put(tx, &key(right, id), &left).map_err(err("index.put"))
    }

    #[inline]
    pub fn del(&self, tx: &mut RwTxn, left: u64, id: u64, right: u64) -> Result<bool> {
        let r = self.fwd.delete(tx, &key(left, id)).map_err(err("index.del"))?;
        self.rev.delete(tx, &key(right, id)).map_err(err("index.del"))?;
        Ok(r)
    }

    /// `(id, right)` for every row with this left key
    pub fn list_fwd(&self, tx: &RoTxn, left: u64) -> Result<Vec<(u64, u64)>> {
        Self::list_pfx(tx, &self.fwd, left)
    }

    /// `(id, left)` for every row with this right key
    pub fn list_rev(&self, tx: &RoTxn, right: u64) -> Result<Vec<(u64, u64)>> {
        Self::list_pfx(tx, &self.rev, right)
    }

    fn list_pfx(tx: &RoTxn, db: &Db, pfx: u64) -> Result<Vec<(u64, u64)>> {
        let mut r = Vec::new();
        for item in db.prefix_iter(tx, &pfx.to_be_bytes()).map_err(err("index.scan"))? {
            let (k, v) = item.map_err(err("index.scan"))?;
            if let Some((_, id)) = split_key(k) {
                r.push((id, v));
            }
        }
        Ok(r)
    }
}

/// Per-table ID sequences
#[derive(Clone, Copy)]
pub struct Sequences {
    meta: DbStr,
}

impl Sequences {
    pub fn next_id(&self, tx: &mut RwTxn, table: &str) -> Result<u64> {
        let id = self.meta.get(tx, table).map_err(err("seq.get"))?.unwrap_or(0) + 1;
        self.meta.put(tx, table, &id).map_err(err("seq.put"))?;
        Ok(id)
    }
}

/// All table handles
pub struct Dbs {
    pub menus: MenuStore,
    pub resources: ResourceStore,
    pub roles: RecordStore<Role>,
    pub users: RecordStore<User>,
    pub user_roles: LinkStore<UserRole>,
    pub role_menus: LinkStore<RoleMenu>,
    pub seq: Sequences,
}

/// An opened environment with its tables
pub struct Storage {
    pub(crate) env: Env,
    pub(crate) dbs: Dbs,
}

impl Storage {
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.db_path).map_err(err("open"))?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size)
                .max_dbs(MAX_DBS)
                .open(Path::new(&config.db_path))
                .map_err(err("open"))?
        };
        let mut tx = env.write_txn().map_err(err("open"))?;
        let name = |n: &str| config.table_name(n);
        let dbs = Dbs {
            menus: MenuStore {
                rows: RecordStore::new(env.create_database(&mut tx, Some(&*name("menu"))).map_err(err("open"))?),
                by_parent: env.create_database(&mut tx, Some(&*name("menu_parent"))).map_err(err("open"))?,
                by_path: env.create_database(&mut tx, Some(&*name("menu_path"))).map_err(err("open"))?,
            },
            resources: ResourceStore {
                rows: RecordStore::new(env.create_database(&mut tx, Some(&*name("menu_resource"))).map_err(err("open"))?),
                by_menu: env.create_database(&mut tx, Some(&*name("menu_resource_menu"))).map_err(err("open"))?,
            },
            roles: RecordStore::new(env.create_database(&mut tx, Some(&*name("role"))).map_err(err("open"))?),
            users: RecordStore::new(env.create_database(&mut tx, Some(&*name("user"))).map_err(err("open"))?),
            user_roles: LinkStore::new(
                env.create_database(&mut tx, Some(&*name("user_role"))).map_err(err("open"))?,
                BiPair {
                    fwd: env.create_database(&mut tx, Some(&*name("user_role_fwd"))).map_err(err("open"))?,
                    rev: env.create_database(&mut tx, Some(&*name("user_role_rev"))).map_err(err("open"))?,
                },
            ),
            role_menus: LinkStore::new(
                env.create_database(&mut tx, Some(&*name("role_menu"))).map_err(err("open"))?,
                BiPair {
                    fwd: env.create_database(&mut tx, Some(&*name("role_menu_fwd"))).map_err(err("open"))?,
                    rev: env.create_database(&mut tx, Some(&*name("role_menu_rev"))).map_err(err("open"))?,
                },
            ),
            seq: Sequences {
                meta: env.create_database(&mut tx, Some(&*name("meta"))).map_err(err("open"))?,
            },
        };
        tx.commit().map_err(err("open"))?;
        info!(path = %config.db_path, prefix = %config.table_prefix, "storage opened");
        Ok(Storage { env, dbs })
    }

    /// Execute a read-only operation against a consistent snapshot
    #[inline]
    pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let tx = self.env.read_txn().map_err(err("read_txn"))?;
        f(&self.dbs, &tx)
    }
}

/// Wall clock in Unix milliseconds
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trips() {
        assert_eq!(split_key(&key(7, 1 << 40)), Some((7, 1 << 40)));
        assert_eq!(split_key(&[0u8; 8]), None);
    }

    #[test]
    fn key_orders_by_first_component() {
        assert!(key(1, u64::MAX) < key(2, 0));
    }
}
