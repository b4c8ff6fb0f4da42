use tracing::info;
use validator::Validate;

use super::{require_all, sync_links, Rbac};
use crate::cascade::{self, Cascade};
use crate::error::{RbacError, Result};
use crate::resolve;
use crate::schema::{
    role_order, LinkFilter, Menu, MenuFilter, Page, Pagination, Role, RoleFilter, RoleForm, RoleWithMenus,
};
use crate::store::Record;
use crate::tx::Tx;

impl Rbac {
    pub fn get_role(&self, id: u64) -> Result<RoleWithMenus> {
        self.storage.read(|d, tx| {
            let role = d.roles.fetch(tx, id)?;
            let menus = d.role_menus.query(tx, LinkFilter::left(id), Pagination::all())?.items;
            Ok(RoleWithMenus { role, menus })
        })
    }

    pub fn query_roles(&self, filter: &RoleFilter, pagination: Pagination) -> Result<Page<Role>> {
        self.storage
            .read(|d, tx| d.roles.query(tx, |r| filter.matches(r), role_order, pagination))
    }

    pub fn create_role(&self, form: &RoleForm) -> Result<RoleWithMenus> {
        form.validate()?;
        let menu_ids = form.menu_ids();
        self.storage.transact(|tx| {
            let d = tx.dbs();
            check_unique(tx, form, None)?;
            require_all(tx, d.menus.rows, &menu_ids)?;
            let mut role = Role::default();
            form.fill_to(&mut role);
            role.id = tx.next_id(Role::TABLE)?;
            role.created_at = tx.now();
            role.updated_at = tx.now();
            d.roles.create(tx.tx(), &role)?;
            let menus = sync_links(tx, d.role_menus, role.id, &menu_ids)?;
            info!(id = role.id, code = %role.code, menus = menus.len(), "role created");
            Ok(RoleWithMenus { role, menus })
        })
    }

    /// Replace a role's fields and its menu grants
    pub fn update_role(&self, id: u64, form: &RoleForm) -> Result<RoleWithMenus> {
        form.validate()?;
        let menu_ids = form.menu_ids();
        self.storage.transact(|tx| {
            let d = tx.dbs();
            let mut role = d.roles.fetch(tx.ro(), id)?;
            check_unique(tx, form, Some(id))?;
            require_all(tx, d.menus.rows, &menu_ids)?;
            form.fill_to(&mut role);
            role.updated_at = tx.now();
            let role = d.roles.update(tx.tx(), &role)?;
            let menus = sync_links(tx, d.role_menus, id, &menu_ids)?;
            info!(id, menus = menus.len(), "role updated");
            Ok(RoleWithMenus { role, menus })
        })
    }

    /// Remove a role with its menu grants and user assignments
    pub fn delete_role(&self, id: u64) -> Result<()> {
        self.storage.transact(|tx| {
            let d = tx.dbs();
            d.roles.fetch(tx.ro(), id)?;
            d.roles.delete(tx.tx(), id)?;
            cascade::apply(tx, &Cascade::RoleDeleted { id })?;
            Ok(())
        })
    }

    /// Menus granted to the role, flat and in display order
    pub fn menus_for_role(&self, role_id: u64, filter: &MenuFilter) -> Result<Vec<Menu>> {
        self.storage.read(|d, tx| {
            d.roles.fetch(tx, role_id)?;
            resolve::menus_for_role(d, tx, role_id, filter)
        })
    }
}

fn check_unique(tx: &Tx, form: &RoleForm, this: Option<u64>) -> Result<()> {
    let taken = tx.dbs().roles.scan(tx.ro(), |r| {
        Some(r.id) != this && (r.code == form.code || r.name == form.name)
    })?;
    match taken.first() {
        Some(r) if r.code == form.code => Err(RbacError::Conflict(format!("role code {} already exists", form.code))),
        Some(_) => Err(RbacError::Conflict(format!("role name {} already exists", form.name))),
        None => Ok(()),
    }
}
