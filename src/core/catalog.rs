//! Versioned item catalogs
//!
//! A [`VersionedCatalog`] stores name -> {version -> item} with a uniform
//! "best match" policy used for both toolchains and libraries. Versions are
//! ordered with the dotted loose scheme used by vendor board packages, which
//! predates semver: numeric segments compare numerically, text segments
//! compare as strings, and a missing trailing segment sorts below a present
//! one ("1.2" < "1.2.1" < "1.10").

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// One dotted segment of a loose version string
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Number(u64),
    Text(String),
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            // Numbered releases sort before named ones
            (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A dotted version string with loose ordering semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseVersion {
    raw: String,
    segments: Vec<Segment>,
}

impl LooseVersion {
    /// Parse a dotted version string. Never fails; any segment that is not
    /// a plain number compares as text.
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('.')
            .map(|s| match s.parse::<u64>() {
                Ok(n) => Segment::Number(n),
                Err(_) => Segment::Text(s.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The original version string
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.segments.iter();
        let mut right = other.segments.iter();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => match a.cmp(b) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                },
                // Missing trailing segments compare lower than present ones
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for LooseVersion {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Store of name -> {version -> item} with best-match selection.
///
/// Entries for one name keep their insertion order so that two versions
/// comparing equal under loose ordering resolve to the most recently
/// discovered item. That tie-break is deliberate policy.
#[derive(Debug, Clone)]
pub struct VersionedCatalog<T> {
    entries: BTreeMap<String, Vec<(LooseVersion, T)>>,
}

impl<T> Default for VersionedCatalog<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> VersionedCatalog<T> {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item under a name and version
    pub fn put(&mut self, name: &str, version: &str, item: T) {
        self.entries
            .entry(name.to_string())
            .or_default()
            .push((LooseVersion::parse(version), item));
    }

    /// Exact name and version lookup. An equal-comparing duplicate resolves
    /// to the latest insertion.
    pub fn get(&self, name: &str, version: &str) -> Option<&T> {
        let wanted = LooseVersion::parse(version);
        self.entries.get(name).and_then(|versions| {
            versions
                .iter()
                .rev()
                .find(|(v, _)| *v == wanted)
                .map(|(_, item)| item)
        })
    }

    /// Highest version for a name, or none if the name is unknown.
    pub fn latest(&self, name: &str) -> Option<&T> {
        self.entries.get(name).and_then(|versions| {
            versions
                .iter()
                .enumerate()
                // max_by on (version, insertion index): later insertion wins ties
                .max_by(|(i, (a, _)), (j, (b, _))| a.cmp(b).then(i.cmp(j)))
                .map(|(_, (_, item))| item)
        })
    }

    /// All versions for a name, descending, most recently inserted first
    /// among equals.
    pub fn all_versions(&self, name: &str) -> Vec<&LooseVersion> {
        let mut versions: Vec<(usize, &LooseVersion)> = self
            .entries
            .get(name)
            .map(|items| items.iter().enumerate().map(|(i, (v, _))| (i, v)).collect())
            .unwrap_or_default();
        versions.sort_by(|(i, a), (j, b)| b.cmp(a).then(j.cmp(i)));
        versions.into_iter().map(|(_, v)| v).collect()
    }

    /// All known names, in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether a name has at least one version
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether the catalog holds no names at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
