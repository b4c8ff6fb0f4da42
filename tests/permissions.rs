//! User and role menu resolution through the join tables

mod common;

use common::*;
use menurbac::{tree, MenuFilter, RbacError, RoleForm, Status, UserForm};

fn user_menu_ids(f: &Fixture, user_id: u64, filter: &MenuFilter) -> Vec<u64> {
    let forest = f.rbac.menus_for_user(user_id, filter).unwrap();
    let mut ids: Vec<u64> = tree::flatten(&forest).iter().map(|m| m.id).collect();
    ids.sort();
    ids
}

#[test]
fn test_user_without_roles_sees_nothing() {
    let f = setup();
    add_menu(&f.rbac, "a", 0);
    add_role(&f.rbac, "r", &[1]);
    let u = add_user(&f.rbac, "alice", &[]);
    assert!(f.rbac.menus_for_user(u.user.id, &MenuFilter::default()).unwrap().is_empty());
}

#[test]
fn test_overlapping_roles_are_deduplicated() {
    let f = setup();
    let m1 = add_menu(&f.rbac, "one", 0);
    let m2 = add_menu(&f.rbac, "two", 0);
    add_menu(&f.rbac, "three", 0);
    let r1 = add_role(&f.rbac, "r1", &[m1.id, m2.id]);
    let r2 = add_role(&f.rbac, "r2", &[m1.id]);
    let u = add_user(&f.rbac, "bob", &[r1.role.id, r2.role.id]);

    assert_eq!(user_menu_ids(&f, u.user.id, &MenuFilter::default()), vec![m1.id, m2.id]);

    let only_r2 = add_user(&f.rbac, "carol", &[r2.role.id]);
    assert_eq!(user_menu_ids(&f, only_r2.user.id, &MenuFilter::default()), vec![m1.id]);
}

#[test]
fn test_user_tree_fills_in_ancestors() {
    let f = setup();
    let sys = add_menu(&f.rbac, "system", 0);
    let menu = add_menu(&f.rbac, "menu", sys.id);
    let add = add_menu(&f.rbac, "add", menu.id);
    let r = add_role(&f.rbac, "editor", &[add.id]);
    let u = add_user(&f.rbac, "dave", &[r.role.id]);

    let forest = f.rbac.menus_for_user(u.user.id, &MenuFilter::default()).unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].menu.id, sys.id);
    assert_eq!(forest[0].children[0].menu.id, menu.id);
    assert_eq!(forest[0].children[0].children[0].menu.id, add.id);
}

#[test]
fn test_enabled_filter_hides_disabled_branch() {
    let f = setup();
    let sys = add_menu(&f.rbac, "system", 0);
    let menu = add_menu(&f.rbac, "menu", sys.id);
    let home = add_menu(&f.rbac, "home", 0);
    let r = add_role(&f.rbac, "r", &[sys.id, menu.id, home.id]);
    let u = add_user(&f.rbac, "erin", &[r.role.id]);

    set_status(&f.rbac, sys.id, Status::Disabled);
    assert_eq!(user_menu_ids(&f, u.user.id, &MenuFilter::enabled()), vec![home.id]);
    assert_eq!(user_menu_ids(&f, u.user.id, &MenuFilter::default()).len(), 3);
}

#[test]
fn test_role_delete_revokes_everything() {
    let f = setup();
    let m = add_menu(&f.rbac, "a", 0);
    let r = add_role(&f.rbac, "r", &[m.id]);
    let u = add_user(&f.rbac, "frank", &[r.role.id]);
    assert_eq!(user_menu_ids(&f, u.user.id, &MenuFilter::default()), vec![m.id]);

    f.rbac.delete_role(r.role.id).unwrap();
    assert!(f.rbac.menus_for_user(u.user.id, &MenuFilter::default()).unwrap().is_empty());
    assert!(f.rbac.get_user(u.user.id).unwrap().roles.is_empty());
    assert!(matches!(f.rbac.get_role(r.role.id), Err(RbacError::NotFound { .. })));

    f.rbac
        .storage()
        .read(|d, tx| {
            assert!(d.role_menus.rights_of(tx, r.role.id)?.is_empty());
            assert!(d.user_roles.rights_of(tx, u.user.id)?.is_empty());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_user_delete_drops_assignments() {
    let f = setup();
    let r = add_role(&f.rbac, "r", &[]);
    let u = add_user(&f.rbac, "gina", &[r.role.id]);
    f.rbac.delete_user(u.user.id).unwrap();

    assert!(matches!(
        f.rbac.menus_for_user(u.user.id, &MenuFilter::default()),
        Err(RbacError::NotFound { .. })
    ));
    f.rbac
        .storage()
        .read(|d, tx| {
            assert!(d.user_roles.rights_of(tx, u.user.id)?.is_empty());
            Ok(())
        })
        .unwrap();
    // The role itself survives
    assert_eq!(f.rbac.get_role(r.role.id).unwrap().role.code, "r");
}

#[test]
fn test_menus_for_role_is_flat_and_ordered() {
    let f = setup();
    let a = add_menu(&f.rbac, "a", 0);
    let b = add_menu(&f.rbac, "b", a.id);
    add_menu(&f.rbac, "c", 0);
    let r = add_role(&f.rbac, "r", &[a.id, b.id]);

    let menus = f.rbac.menus_for_role(r.role.id, &MenuFilter::default()).unwrap();
    assert_eq!(ids(&menus), vec![b.id, a.id]);
    assert!(matches!(
        f.rbac.menus_for_role(99, &MenuFilter::default()),
        Err(RbacError::NotFound { .. })
    ));
}

#[test]
fn test_reassignment_changes_reach() {
    let f = setup();
    let m1 = add_menu(&f.rbac, "one", 0);
    let m2 = add_menu(&f.rbac, "two", 0);
    let r1 = add_role(&f.rbac, "r1", &[m1.id]);
    let r2 = add_role(&f.rbac, "r2", &[m2.id]);
    let u = add_user(&f.rbac, "hank", &[r1.role.id]);

    let form = UserForm {
        roles: vec![r2.role.id],
        ..user_form("hank", "hank")
    };
    f.rbac.update_user(u.user.id, &form).unwrap();
    assert_eq!(user_menu_ids(&f, u.user.id, &MenuFilter::default()), vec![m2.id]);

    let form = RoleForm {
        code: "r2".into(),
        name: "r2 name".into(),
        menus: vec![m1.id, m2.id],
        ..Default::default()
    };
    f.rbac.update_role(r2.role.id, &form).unwrap();
    assert_eq!(user_menu_ids(&f, u.user.id, &MenuFilter::default()), vec![m1.id, m2.id]);
}
