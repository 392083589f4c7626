//! Hierarchical build properties
//!
//! A [`PropertyTree`] is an ordered map from dotted keys ("build.mcu",
//! "recipe.c.o.pattern") to string values. Layering is done by merging:
//! the overlay replaces base values on exact key match, and the inputs are
//! never mutated. Cascades (platform -> board -> menu -> project) are
//! expressed as an explicit left-to-right fold of merges, never as a live
//! lookup chain.

use std::collections::BTreeMap;

/// Ordered key/value store with dotted hierarchical keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTree {
    entries: BTreeMap<String, String>,
}

impl PropertyTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` text lines into a tree.
    ///
    /// Blank lines and `#` comment lines are ignored. A duplicate key keeps
    /// the last occurrence, matching overlay-replaces-base semantics at the
    /// line level. Values keep everything after the first `=`, trimmed.
    pub fn parse(text: &str) -> Self {
        let mut tree = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                tree.set(key.trim(), value.trim());
            }
        }
        tree
    }

    /// Look up a value. Absence is a valid, checkable state, not an error.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set a key, replacing any existing value
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Merge an overlay onto this tree, returning a new tree.
    ///
    /// Every key from `self` is kept unless `overlay` defines the same key,
    /// in which case the overlay value wins. Exact key match only; no
    /// prefix merging. Neither input is mutated.
    #[must_use]
    pub fn merge(&self, overlay: &PropertyTree) -> PropertyTree {
        let mut entries = self.entries.clone();
        for (key, value) in &overlay.entries {
            entries.insert(key.clone(), value.clone());
        }
        PropertyTree { entries }
    }

    /// Fold a sequence of overlays onto a base, left to right.
    ///
    /// Layering is order-sensitive and right-biased: later layers win.
    #[must_use]
    pub fn merge_layers<'a, I>(base: &PropertyTree, overlays: I) -> PropertyTree
    where
        I: IntoIterator<Item = &'a PropertyTree>,
    {
        overlays
            .into_iter()
            .fold(base.clone(), |acc, layer| acc.merge(layer))
    }

    /// Extract all keys under a dotted prefix, with the prefix stripped.
    ///
    /// `sub_tree("recipe")` on a tree holding `recipe.c.o.pattern` yields a
    /// tree holding `c.o.pattern`. The bare key equal to the prefix itself
    /// is not included.
    #[must_use]
    pub fn sub_tree(&self, prefix: &str) -> PropertyTree {
        let dotted = format!("{prefix}.");
        let entries = self
            .entries
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&dotted)
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect();
        PropertyTree { entries }
    }

    /// First dotted segments of all keys, deduplicated, in key order.
    ///
    /// Used to enumerate board identifiers from a boards file and option
    /// values from a menu group.
    pub fn first_segments(&self) -> Vec<String> {
        let mut segments: Vec<String> = Vec::new();
        for key in self.entries.keys() {
            let segment = key.split('.').next().unwrap_or(key);
            if segments.last().map(String::as_str) != Some(segment) {
                segments.push(segment.to_string());
            }
        }
        segments
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for PropertyTree {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        PropertyTree {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree_of(pairs: &[(&str, &str)]) -> PropertyTree {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let tree = PropertyTree::parse(
            "# header comment\n\nbuild.mcu=atmega328p\n   \nname=Arduino Uno\n",
        );
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("build.mcu"), Some("atmega328p"));
        assert_eq!(tree.get("name"), Some("Arduino Uno"));
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let tree = PropertyTree::parse("a=1\na=2\n");
        assert_eq!(tree.get("a"), Some("2"));
    }

    #[test]
    fn test_parse_keeps_equals_in_value() {
        let tree = PropertyTree::parse("flags=-DVALUE=1\n");
        assert_eq!(tree.get("flags"), Some("-DVALUE=1"));
    }

    #[test]
    fn test_merge_overlay_wins_on_collision() {
        let base = tree_of(&[("a", "1"), ("b", "2")]);
        let overlay = tree_of(&[("b", "3"), ("c", "4")]);
        let merged = base.merge(&overlay);

        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("3"));
        assert_eq!(merged.get("c"), Some("4"));
        // inputs untouched
        assert_eq!(base.get("b"), Some("2"));
        assert!(!overlay.contains_key("a"));
    }

    #[test]
    fn test_merge_layers_matches_pairwise_left_fold() {
        let a = tree_of(&[("k", "a"), ("x", "a")]);
        let b = tree_of(&[("k", "b"), ("y", "b")]);
        let c = tree_of(&[("k", "c"), ("z", "c")]);

        let folded = PropertyTree::merge_layers(&a, [&b, &c]);
        let pairwise = a.merge(&b).merge(&c);

        assert_eq!(folded, pairwise);
        assert_eq!(folded.get("k"), Some("c"));
        assert_eq!(folded.get("x"), Some("a"));
    }

    #[test]
    fn test_sub_tree_strips_prefix() {
        let tree = tree_of(&[
            ("recipe.c.o.pattern", "cc"),
            ("recipe.ar.pattern", "ar"),
            ("recipe", "bare"),
            ("other", "x"),
        ]);
        let sub = tree.sub_tree("recipe");

        assert_eq!(sub.len(), 2);
        assert_eq!(sub.get("c.o.pattern"), Some("cc"));
        assert_eq!(sub.get("ar.pattern"), Some("ar"));
        assert!(!sub.contains_key("recipe"));
    }

    #[test]
    fn test_first_segments_enumerates_board_ids() {
        let tree = tree_of(&[
            ("uno.name", "Arduino Uno"),
            ("uno.build.mcu", "atmega328p"),
            ("mega.name", "Arduino Mega"),
        ]);
        assert_eq!(tree.first_segments(), vec!["mega", "uno"]);
    }

    #[test]
    fn test_get_absent_key_is_none() {
        let tree = PropertyTree::new();
        assert_eq!(tree.get("missing"), None);
        assert!(!tree.contains_key("missing"));
    }

    // ============================================
    // Property-Based Tests
    // ============================================

    fn key_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,6}(\\.[a-z]{1,6}){0,2}"
    }

    fn tree_strategy() -> impl Strategy<Value = PropertyTree> {
        proptest::collection::btree_map(key_strategy(), "[a-zA-Z0-9 -]{0,12}", 0..8)
            .prop_map(|map| map.into_iter().collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For every key the overlay defines, merge returns the overlay
        /// value; otherwise it returns the base value.
        #[test]
        fn prop_merge_is_right_biased(base in tree_strategy(), overlay in tree_strategy()) {
            let merged = base.merge(&overlay);

            for (key, value) in overlay.iter() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, value) in base.iter() {
                if !overlay.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
            for (key, _) in merged.iter() {
                prop_assert!(base.contains_key(key) || overlay.contains_key(key));
            }
        }

        /// Layered fold equals explicit pairwise application.
        #[test]
        fn prop_merge_layers_is_left_fold(
            a in tree_strategy(),
            b in tree_strategy(),
            c in tree_strategy(),
        ) {
            prop_assert_eq!(
                PropertyTree::merge_layers(&a, [&b, &c]),
                a.merge(&b).merge(&c)
            );
        }
    }
}
