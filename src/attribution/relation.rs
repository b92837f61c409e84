// Ownership relations between a root and its reachable descendants

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// How a descendant relates to the root it was reached from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    /// Construction-time value; never present in a finished index
    Unknown,
    /// Owned by the root (within the share tolerance)
    Single,
    /// Reachable independently of the root
    Shared,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RelationKind::Unknown => "Unknown",
            RelationKind::Single => "Single",
            RelationKind::Shared => "Shared",
        };
        f.write_str(label)
    }
}

/// Descendant id -> relation, in discovery order
pub type RelationMap = IndexMap<String, RelationKind>;

/// Root (or pseudo-root) key -> its classified descendants
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationIndex {
    roots: IndexMap<String, RelationMap>,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, root: String, relations: RelationMap) {
        self.roots.insert(root, relations);
    }

    /// Descendant map of `root`, if it was attributed
    pub fn get(&self, root: &str) -> Option<&RelationMap> {
        self.roots.get(root)
    }

    pub fn relation(&self, root: &str, descendant: &str) -> Option<RelationKind> {
        self.roots
            .get(root)
            .and_then(|map| map.get(descendant))
            .copied()
    }

    /// True when `descendant` is reachable from `root`
    ///
    /// Unknown roots reach nothing.
    pub fn reaches(&self, root: &str, descendant: &str) -> bool {
        self.roots
            .get(root)
            .is_some_and(|map| map.contains_key(descendant))
    }

    pub fn contains_root(&self, root: &str) -> bool {
        self.roots.contains_key(root)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationMap)> {
        self.roots.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Descendants of `root` with the given classification
    pub fn with_kind<'a>(
        &'a self,
        root: &str,
        kind: RelationKind,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.roots
            .get(root)
            .into_iter()
            .flat_map(move |map| {
                map.iter()
                    .filter(move |(_, k)| **k == kind)
                    .map(|(id, _)| id.as_str())
            })
    }
}
