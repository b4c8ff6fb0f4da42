//! Follow-on writes triggered by moves, status changes and deletes.
//!
//! Every cascade runs inside the caller's write transaction, after the
//! triggering row itself has been written, so the parent row and its batch of
//! dependents commit or abort together.

use tracing::info;

use crate::error::{RbacError, Result};
use crate::path;
use crate::schema::Status;
use crate::tx::Tx;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cascade {
    /// A menu changed parent; descendants still carry `old_own_path`
    MenuMoved { id: u64, old_own_path: String, new_own_path: String },
    /// A menu's status changed. Only disabling propagates.
    MenuStatusChanged { id: u64, own_path: String, status: Status },
    MenuDeleted { id: u64 },
    RoleDeleted { id: u64 },
    UserDeleted { id: u64 },
}

/// Apply one cascade; returns how many dependent rows were written or removed
pub fn apply(tx: &mut Tx, event: &Cascade) -> Result<usize> {
    let d = tx.dbs();
    let n = match event {
        Cascade::MenuMoved { id, old_own_path, new_own_path } => {
            let n = rebase_descendants(tx, old_own_path, new_own_path)?;
            info!(id, from = %old_own_path, to = %new_own_path, descendants = n, "menu moved");
            n
        }
        Cascade::MenuStatusChanged { id, own_path, status: Status::Disabled } => {
            let now = tx.now();
            let n = d.menus.update_status_by_parent_path_prefix(tx.tx(), own_path, Status::Disabled, now)?;
            info!(id, descendants = n, "menu disabled with its subtree");
            n
        }
        // Re-enabling leaves descendants alone
        Cascade::MenuStatusChanged { status: Status::Enabled, .. } => 0,
        Cascade::MenuDeleted { id } => {
            let grants = d.role_menus.delete_by_right(tx.tx(), *id)?;
            let resources = d.resources.delete_by_menu(tx.tx(), *id)?;
            info!(id, role_menus = grants, resources, "menu deleted");
            grants + resources
        }
        Cascade::RoleDeleted { id } => {
            let menus = d.role_menus.delete_by_left(tx.tx(), *id)?;
            let users = d.user_roles.delete_by_right(tx.tx(), *id)?;
            info!(id, role_menus = menus, user_roles = users, "role deleted");
            menus + users
        }
        Cascade::UserDeleted { id } => {
            let n = d.user_roles.delete_by_left(tx.tx(), *id)?;
            info!(id, user_roles = n, "user deleted");
            n
        }
    };
    Ok(n)
}

/// Rewrite every parent path under `old_prefix` to sit under `new_prefix`
fn rebase_descendants(tx: &mut Tx, old_prefix: &str, new_prefix: &str) -> Result<usize> {
    if old_prefix == new_prefix {
        return Ok(0);
    }
    let d = tx.dbs();
    let now = tx.now();
    let mut n = 0;
    for id in d.menus.ids_with_path_prefix(tx.ro(), old_prefix)? {
        let m = d.menus.fetch(tx.ro(), id)?;
        let Some(new_path) = path::rebase(&m.parent_path, old_prefix, new_prefix) else {
            continue;
        };
        d.menus.update_parent_path(tx.tx(), id, &new_path, now)?;
        n += 1;
    }
    Ok(n)
}

/// Parent path a child of `parent_id` must carry; the parent has to exist
pub fn parent_path_for(tx: &Tx, parent_id: u64) -> Result<String> {
    if parent_id == 0 {
        return Ok(String::new());
    }
    match tx.dbs().menus.get(tx.ro(), parent_id)? {
        Some(parent) => Ok(parent.own_path()),
        None => Err(RbacError::InvalidInput(format!("parent menu {parent_id} not found"))),
    }
}
