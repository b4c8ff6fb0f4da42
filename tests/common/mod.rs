//! Shared fixtures: one fresh LMDB environment per test

#![allow(dead_code)]

use menurbac::{Config, Menu, MenuForm, Rbac, RoleForm, RoleWithMenus, Status, UserForm, UserStatus, UserWithRoles};
use tempfile::TempDir;

pub struct Fixture {
    pub rbac: Rbac,
    _dir: TempDir,
}

pub fn setup() -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut config = Config::with_path(dir.path().to_str().unwrap());
    config.map_size = 16 << 20;
    let rbac = Rbac::open(&config).unwrap();
    Fixture { rbac, _dir: dir }
}

pub fn menu_form(code: &str, parent_id: u64) -> MenuForm {
    MenuForm {
        code: code.into(),
        name: format!("{code} name"),
        parent_id,
        status: Some(Status::Enabled),
        ..Default::default()
    }
}

pub fn add_menu(rbac: &Rbac, code: &str, parent_id: u64) -> Menu {
    rbac.create_menu(&menu_form(code, parent_id)).unwrap()
}

pub fn set_status(rbac: &Rbac, id: u64, status: Status) -> Menu {
    let m = rbac.get_menu(id).unwrap();
    let form = MenuForm { status: Some(status), ..MenuForm::from(&m) };
    rbac.update_menu(id, &form).unwrap()
}

pub fn move_menu(rbac: &Rbac, id: u64, parent_id: u64) -> menurbac::Result<Menu> {
    let m = rbac.get_menu(id).unwrap();
    let form = MenuForm { parent_id, ..MenuForm::from(&m) };
    rbac.update_menu(id, &form)
}

pub fn add_role(rbac: &Rbac, code: &str, menus: &[u64]) -> RoleWithMenus {
    rbac.create_role(&RoleForm {
        code: code.into(),
        name: format!("{code} name"),
        menus: menus.to_vec(),
        ..Default::default()
    })
    .unwrap()
}

pub fn user_form(username: &str, name: &str) -> UserForm {
    UserForm {
        username: username.into(),
        name: name.into(),
        status: Some(UserStatus::Activated),
        ..Default::default()
    }
}

pub fn add_user(rbac: &Rbac, username: &str, roles: &[u64]) -> UserWithRoles {
    rbac.create_user(&UserForm {
        roles: roles.to_vec(),
        ..user_form(username, username)
    })
    .unwrap()
}

pub fn ids(menus: &[Menu]) -> Vec<u64> {
    menus.iter().map(|m| m.id).collect()
}
