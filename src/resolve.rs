//! Permission resolution.
//!
//! User → roles and roles → menus are two narrow hops over the join tables,
//! each producing a deduplicated ID set. Menu rows are fetched once, at the end,
//! with any further menu filters applied on top of the ID restriction.

use std::collections::BTreeSet;

use heed::RoTxn;
use tracing::debug;

use crate::db::Dbs;
use crate::error::Result;
use crate::schema::{Menu, MenuFilter, Pagination};

/// Role IDs assigned to a user
pub fn role_ids_for_user(d: &Dbs, tx: &RoTxn, user_id: u64) -> Result<BTreeSet<u64>> {
    d.user_roles.rights_of(tx, user_id)
}

/// Menu IDs granted to any of the roles
pub fn menu_ids_for_roles(d: &Dbs, tx: &RoTxn, role_ids: &BTreeSet<u64>) -> Result<BTreeSet<u64>> {
    d.role_menus.rights_of_any(tx, role_ids)
}

/// Menu IDs granted to one role
pub fn menu_ids_for_role(d: &Dbs, tx: &RoTxn, role_id: u64) -> Result<BTreeSet<u64>> {
    d.role_menus.rights_of(tx, role_id)
}

/// Menu IDs reachable by a user through all of its roles
pub fn menu_ids_for_user(d: &Dbs, tx: &RoTxn, user_id: u64) -> Result<BTreeSet<u64>> {
    let roles = role_ids_for_user(d, tx, user_id)?;
    if roles.is_empty() {
        debug!(user_id, "user has no roles");
        return Ok(BTreeSet::new());
    }
    let menus = menu_ids_for_roles(d, tx, &roles)?;
    debug!(user_id, roles = roles.len(), menus = menus.len(), "resolved user menus");
    Ok(menus)
}

/// Menus reachable by a user, narrowed by `filter`, in display order
pub fn menus_for_user(d: &Dbs, tx: &RoTxn, user_id: u64, filter: &MenuFilter) -> Result<Vec<Menu>> {
    let filter = MenuFilter {
        user_id: Some(user_id),
        ..filter.clone()
    };
    Ok(d.query_menus(tx, &filter, Pagination::all())?.items)
}

/// Menus granted to a role, narrowed by `filter`, in display order
pub fn menus_for_role(d: &Dbs, tx: &RoTxn, role_id: u64, filter: &MenuFilter) -> Result<Vec<Menu>> {
    let filter = MenuFilter {
        role_id: Some(role_id),
        ..filter.clone()
    };
    Ok(d.query_menus(tx, &filter, Pagination::all())?.items)
}
