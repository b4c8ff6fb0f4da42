//! Materialized parent paths.
//!
//! A menu's parent path is the chain of ancestor IDs from the root down to its
//! immediate parent, each followed by `.`: a menu under `3` which is under `1`
//! has path `1.3.`. Roots have the empty path. The trailing delimiter makes
//! prefix matching exact: `1.` never matches `11.`.

use tracing::warn;

pub const DELIMITER: char = '.';

/// Sentinel some callers use for "the root"; never a real path
pub const ROOT_MARKER: &str = "0.";

/// Join ancestor IDs (root first) into a path
pub fn encode(ancestors: &[u64]) -> String {
    let mut s = String::with_capacity(ancestors.len() * 4);
    for id in ancestors {
        s.push_str(&id.to_string());
        s.push(DELIMITER);
    }
    s
}

/// Split a path back into ancestor IDs. Malformed segments are logged and skipped.
pub fn decode(path: &str) -> Vec<u64> {
    path.split(DELIMITER)
        .filter(|seg| !seg.is_empty())
        .filter_map(|seg| match seg.parse::<u64>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(segment = seg, path, error = %e, "skipping malformed path segment");
                None
            }
        })
        .collect()
}

/// True when `path` denotes the root; a prefix filter on it would match every row
pub fn is_root_prefix(path: &str) -> bool {
    path.is_empty() || path == ROOT_MARKER
}

/// The path a menu's children carry: its own parent path plus its ID
pub fn child_path(parent_path: &str, id: u64) -> String {
    format!("{parent_path}{id}{DELIMITER}")
}

/// Replace `old_prefix` at the start of `path` with `new_prefix`, keeping the suffix
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    path.strip_prefix(old_prefix)
        .map(|suffix| format!("{new_prefix}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        assert_eq!(encode(&[]), "");
        assert_eq!(encode(&[1, 2, 30]), "1.2.30.");
        assert_eq!(decode("1.2.30."), vec![1, 2, 30]);
        assert_eq!(decode(""), Vec::<u64>::new());
    }

    #[test]
    fn decode_skips_garbage() {
        assert_eq!(decode("1.x.3."), vec![1, 3]);
        assert_eq!(decode("..4..-1.5"), vec![4, 5]);
    }

    #[test]
    fn root_prefix_guard() {
        assert!(is_root_prefix(""));
        assert!(is_root_prefix("0."));
        assert!(!is_root_prefix("1."));
    }

    #[test]
    fn child_path_extends() {
        assert_eq!(child_path("", 1), "1.");
        assert_eq!(child_path("1.", 2), "1.2.");
        assert_eq!(decode(&child_path("1.2.", 4)), vec![1, 2, 4]);
    }

    #[test]
    fn rebase_keeps_suffix() {
        assert_eq!(rebase("1.2.", "1.2.", "3.2.").as_deref(), Some("3.2."));
        assert_eq!(rebase("1.2.7.9.", "1.2.", "3.2.").as_deref(), Some("3.2.7.9."));
        assert_eq!(rebase("11.2.", "1.", "3."), None);
    }
}
