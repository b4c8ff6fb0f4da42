//! Menurbac - menu-tree RBAC on LMDB
//!
//! Menus form a forest addressed by materialized parent paths (`"1.2."`).
//! Users reach menus through roles; [`Rbac`] resolves them into a tree and
//! keeps paths, statuses and join rows consistent on every change.

pub mod cascade;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod path;
pub mod resolve;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;
pub mod service;
pub mod store;
pub mod tree;
pub mod tx;

pub use config::Config;
pub use db::{Dbs, Storage};
pub use error::{RbacError, Result};
pub use logging::init_logging;
pub use schema::*;
pub use service::Rbac;
pub use tree::build_tree;
pub use tx::Tx;
