use tracing::info;
use validator::Validate;

use super::menu::with_ancestors;
use super::{require_all, sync_links, Rbac};
use crate::cascade::{self, Cascade};
use crate::error::{RbacError, Result};
use crate::resolve;
use crate::schema::{
    user_order, LinkFilter, MenuFilter, MenuNode, Page, Pagination, User, UserFilter, UserForm, UserWithRoles,
};
use crate::store::Record;
use crate::tree;

impl Rbac {
    pub fn get_user(&self, id: u64) -> Result<UserWithRoles> {
        self.storage.read(|d, tx| {
            let user = d.users.fetch(tx, id)?;
            let roles = d.user_roles.query(tx, LinkFilter::left(id), Pagination::all())?.items;
            Ok(UserWithRoles { user, roles })
        })
    }

    pub fn query_users(&self, filter: &UserFilter, pagination: Pagination) -> Result<Page<User>> {
        self.storage
            .read(|d, tx| d.users.query(tx, |u| filter.matches(u), user_order, pagination))
    }

    pub fn create_user(&self, form: &UserForm) -> Result<UserWithRoles> {
        form.validate()?;
        let role_ids = form.role_ids();
        self.storage.transact(|tx| {
            let d = tx.dbs();
            if !d.users.scan(tx.ro(), |u| u.username == form.username)?.is_empty() {
                return Err(RbacError::Conflict(format!("username {} already exists", form.username)));
            }
            require_all(tx, d.roles, &role_ids)?;
            let mut user = User::default();
            form.fill_to(&mut user);
            user.id = tx.next_id(User::TABLE)?;
            user.created_at = tx.now();
            user.updated_at = tx.now();
            d.users.create(tx.tx(), &user)?;
            let roles = sync_links(tx, d.user_roles, user.id, &role_ids)?;
            info!(id = user.id, username = %user.username, roles = roles.len(), "user created");
            Ok(UserWithRoles { user, roles })
        })
    }

    /// Replace a user's fields and role assignments
    pub fn update_user(&self, id: u64, form: &UserForm) -> Result<UserWithRoles> {
        form.validate()?;
        let role_ids = form.role_ids();
        self.storage.transact(|tx| {
            let d = tx.dbs();
            let mut user = d.users.fetch(tx.ro(), id)?;
            if !d.users.scan(tx.ro(), |u| u.id != id && u.username == form.username)?.is_empty() {
                return Err(RbacError::Conflict(format!("username {} already exists", form.username)));
            }
            require_all(tx, d.roles, &role_ids)?;
            form.fill_to(&mut user);
            user.updated_at = tx.now();
            let user = d.users.update(tx.tx(), &user)?;
            let roles = sync_links(tx, d.user_roles, id, &role_ids)?;
            info!(id, roles = roles.len(), "user updated");
            Ok(UserWithRoles { user, roles })
        })
    }

    /// Remove a user and its role assignments
    pub fn delete_user(&self, id: u64) -> Result<()> {
        self.storage.transact(|tx| {
            let d = tx.dbs();
            d.users.fetch(tx.ro(), id)?;
            d.users.delete(tx.tx(), id)?;
            cascade::apply(tx, &Cascade::UserDeleted { id })?;
            Ok(())
        })
    }

    /// The user's menus as a forest, with ungranted ancestors filled in
    pub fn menus_for_user(&self, user_id: u64, filter: &MenuFilter) -> Result<Vec<MenuNode>> {
        self.storage.read(|d, tx| {
            d.users.fetch(tx, user_id)?;
            let menus = resolve::menus_for_user(d, tx, user_id, filter)?;
            Ok(tree::build_tree(with_ancestors(d, tx, menus, filter)?))
        })
    }
}
