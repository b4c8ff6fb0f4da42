//! Flat menu lists to forests

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::path;
use crate::schema::{Menu, MenuNode};

/// Build a forest from `menus` by `parent_id`.
///
/// Roots (`parent_id == 0`) and each child list keep the input order. A menu
/// whose parent is not in the input is dropped, not promoted to a root, so
/// callers wanting a full tree must pass a parent-inclusive list. Repeated IDs
/// after the first are ignored.
pub fn build_tree(menus: Vec<Menu>) -> Vec<MenuNode> {
    let mut index: HashMap<u64, usize> = HashMap::with_capacity(menus.len());
    let mut slots: Vec<Option<Menu>> = Vec::with_capacity(menus.len());
    for m in menus {
        if index.contains_key(&m.id) {
            continue;
        }
        index.insert(m.id, slots.len());
        slots.push(Some(m));
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    for (i, slot) in slots.iter().enumerate() {
        let Some(m) = slot else { continue };
        if m.is_root() {
            roots.push(i);
            continue;
        }
        match index.get(&m.parent_id) {
            Some(&p) if p != i => children[p].push(i),
            _ => debug!(id = m.id, parent_id = m.parent_id, "dropping orphan menu"),
        }
    }

    roots
        .into_iter()
        .filter_map(|i| assemble(i, &mut slots, &children))
        .collect()
}

fn assemble(i: usize, slots: &mut [Option<Menu>], children: &[Vec<usize>]) -> Option<MenuNode> {
    let menu = slots[i].take()?;
    let children = children[i]
        .iter()
        .filter_map(|&c| assemble(c, slots, children))
        .collect();
    Some(MenuNode { menu, children })
}

/// Every ancestor ID named by the menus' parent paths, deduplicated
pub fn collect_ancestor_ids(menus: &[Menu]) -> BTreeSet<u64> {
    menus
        .iter()
        .flat_map(|m| path::decode(&m.parent_path))
        .collect()
}

/// Ancestor IDs not already present in `menus`
pub fn missing_ancestor_ids(menus: &[Menu]) -> BTreeSet<u64> {
    let present: BTreeSet<u64> = menus.iter().map(|m| m.id).collect();
    collect_ancestor_ids(menus)
        .into_iter()
        .filter(|id| !present.contains(id))
        .collect()
}

/// Depth-first walk yielding every menu in the forest
pub fn flatten(forest: &[MenuNode]) -> Vec<&Menu> {
    let mut out = Vec::new();
    let mut stack: Vec<&MenuNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(&node.menu);
        stack.extend(node.children.iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(id: u64, parent_id: u64, parent_path: &str) -> Menu {
        Menu {
            id,
            parent_id,
            parent_path: parent_path.into(),
            code: format!("m{id}"),
            ..Default::default()
        }
    }

    fn ids(forest: &[MenuNode]) -> Vec<u64> {
        flatten(forest).iter().map(|m| m.id).collect()
    }

    #[test]
    fn builds_nested_forest_in_input_order() {
        let flat = vec![
            menu(1, 0, ""),
            menu(2, 1, "1."),
            menu(3, 0, ""),
            menu(4, 2, "1.2."),
            menu(5, 1, "1."),
        ];
        let forest = build_tree(flat);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].menu.id, 1);
        assert_eq!(forest[1].menu.id, 3);
        let kids: Vec<u64> = forest[0].children.iter().map(|n| n.menu.id).collect();
        assert_eq!(kids, vec![2, 5]);
        assert_eq!(forest[0].children[0].children[0].menu.id, 4);
        assert_eq!(ids(&forest), vec![1, 2, 4, 5, 3]);
    }

    #[test]
    fn child_before_parent_still_attaches() {
        let forest = build_tree(vec![menu(2, 1, "1."), menu(1, 0, "")]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children[0].menu.id, 2);
    }

    #[test]
    fn orphans_are_dropped_not_promoted() {
        let forest = build_tree(vec![menu(1, 0, ""), menu(4, 2, "1.2."), menu(5, 4, "1.2.4.")]);
        assert_eq!(ids(&forest), vec![1]);
    }

    #[test]
    fn deterministic_for_same_input() {
        let flat = vec![menu(1, 0, ""), menu(2, 1, "1."), menu(3, 1, "1."), menu(4, 3, "1.3.")];
        assert_eq!(build_tree(flat.clone()), build_tree(flat));
    }

    #[test]
    fn self_parent_and_duplicates_are_ignored() {
        let forest = build_tree(vec![menu(1, 0, ""), menu(1, 0, ""), menu(7, 7, "7.")]);
        assert_eq!(ids(&forest), vec![1]);
    }

    #[test]
    fn collects_ancestors() {
        let flat = vec![menu(4, 2, "1.2."), menu(5, 2, "1.2."), menu(9, 8, "8.")];
        let all: Vec<u64> = collect_ancestor_ids(&flat).into_iter().collect();
        assert_eq!(all, vec![1, 2, 8]);
        let flat = vec![menu(2, 1, "1."), menu(4, 2, "1.2.")];
        let missing: Vec<u64> = missing_ancestor_ids(&flat).into_iter().collect();
        assert_eq!(missing, vec![1]);
    }
}
