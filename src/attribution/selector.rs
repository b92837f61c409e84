// Root selectors: one attribution query each
//
// The whole-tree, entry, test-set and module reports differ only in which
// files act as roots, whether those roots are attributed one by one or as a
// single pseudo-root, and how much sharing is tolerated.

use crate::dependency_graph::DependencyGraph;
use crate::root_set::RootSet;
use serde::{Deserialize, Serialize};

/// How the selected roots are attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootMode {
    /// Every root gets its own relation map and cost
    PerRoot,
    /// The whole root set is one pseudo-root keyed by the selector name
    Combined,
}

/// A named root set plus sharing tolerance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSelector {
    pub name: String,
    pub roots: Vec<String>,
    /// Number of external parents a descendant may have and still count
    pub share_tolerance: usize,
    pub mode: RootMode,
}

impl RootSelector {
    pub fn per_root(name: impl Into<String>, roots: Vec<String>, share_tolerance: usize) -> Self {
        Self {
            name: name.into(),
            roots,
            share_tolerance,
            mode: RootMode::PerRoot,
        }
    }

    pub fn combined(name: impl Into<String>, roots: Vec<String>, share_tolerance: usize) -> Self {
        Self {
            name: name.into(),
            roots,
            share_tolerance,
            mode: RootMode::Combined,
        }
    }

    /// One root per file that imports something, tolerance 0
    pub fn whole_tree(graph: &DependencyGraph) -> Self {
        let roots = graph
            .nodes()
            .filter(|n| !n.children.is_empty())
            .map(|n| n.id.clone())
            .collect();
        Self::per_root("tree", roots, 0)
    }

    /// Flattest view: every file is a root
    pub fn every_file(graph: &DependencyGraph) -> Self {
        let roots = graph.ids().map(str::to_string).collect();
        Self::per_root("tree", roots, 0)
    }

    /// Files matching the entry list, each attributed on its own
    ///
    /// `share_count` descendants shared with up to that many outside
    /// importers still count toward each entry.
    pub fn entries(graph: &DependencyGraph, entries: &RootSet, share_count: usize) -> Self {
        let roots = graph
            .ids()
            .filter(|id| entries.matches(id))
            .map(str::to_string)
            .collect();
        Self::per_root("entry", roots, share_count)
    }

    /// Files matching the test list, attributed as one pseudo-root
    pub fn test_set(graph: &DependencyGraph, tests: &RootSet) -> Self {
        let roots = graph
            .ids()
            .filter(|id| tests.matches(id))
            .map(str::to_string)
            .collect();
        Self::combined("test", roots, 0)
    }

    pub fn with_tolerance(mut self, share_tolerance: usize) -> Self {
        self.share_tolerance = share_tolerance;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
