// Sibling overlap: how much cost two imports of the same parent double-pay
//
// Only annotates reports; never feeds back into a root's rollup.

use super::engine::Attribution;
use super::AttributionError;
use crate::dependency_graph::DependencyGraph;
use serde::Serialize;
use std::fmt;

/// Shape of the intersection between two sibling subtrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverlapKind {
    /// No containment and no common direct child
    None,
    /// The other sibling is inside this sibling's subtree
    In,
    /// This sibling is inside the other sibling's subtree
    Out,
    /// Neither contains the other, but they import common files
    Shared,
    /// Each contains the other (cyclic siblings)
    Unknown,
}

impl fmt::Display for OverlapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OverlapKind::None => "None",
            OverlapKind::In => "In",
            OverlapKind::Out => "Out",
            OverlapKind::Shared => "Shared",
            OverlapKind::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Overlap of one sibling against another
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiblingOverlap {
    pub sibling: String,
    pub kind: OverlapKind,
    pub cost: f64,
}

/// Compare children `a` and `b` of `parent`
///
/// Containment and costs are taken with each sibling as its own root at
/// tolerance 0. `attribution` supplies them when it was computed that way
/// (the whole-tree attribution is); anything missing is attributed on demand.
///
/// | kind     | condition                         | cost                    |
/// |----------|-----------------------------------|-------------------------|
/// | `In`     | `b` reachable from `a`            | cost of `b`             |
/// | `Out`    | `a` reachable from `b`            | cost of `a`             |
/// | `Unknown`| both of the above                 | cost of `a` + `b`       |
/// | `Shared` | common direct children            | sum of their costs      |
/// | `None`   | otherwise                         | 0                       |
pub fn overlap(
    graph: &DependencyGraph,
    attribution: &Attribution,
    parent: &str,
    a: &str,
    b: &str,
) -> Result<SiblingOverlap, AttributionError> {
    for child in [a, b] {
        let is_child = graph
            .node(parent)
            .is_some_and(|node| node.children.contains_key(child));
        if !is_child {
            return Err(AttributionError::NotSiblings {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
    }

    let a_contains_b = attribution.edge_reaches(graph, a, b)?;
    let b_contains_a = attribution.edge_reaches(graph, b, a)?;

    let (kind, cost) = match (a_contains_b, b_contains_a) {
        (true, true) => (
            OverlapKind::Unknown,
            attribution.edge_cost(graph, a)? + attribution.edge_cost(graph, b)?,
        ),
        (true, false) => (OverlapKind::In, attribution.edge_cost(graph, b)?),
        (false, true) => (OverlapKind::Out, attribution.edge_cost(graph, a)?),
        (false, false) => {
            let b_children: Vec<&str> = graph.children(b).collect();
            let common: Vec<&str> = graph
                .children(a)
                .filter(|c| b_children.contains(c))
                .collect();
            if common.is_empty() {
                (OverlapKind::None, 0.0)
            } else {
                let cost = common
                    .iter()
                    .map(|c| attribution.edge_cost(graph, c))
                    .sum::<Result<f64, _>>()?;
                (OverlapKind::Shared, cost)
            }
        }
    };

    Ok(SiblingOverlap {
        sibling: b.to_string(),
        kind,
        cost,
    })
}

/// Every non-empty overlap of `child` against its siblings under `parent`
pub fn sibling_overlaps(
    graph: &DependencyGraph,
    attribution: &Attribution,
    parent: &str,
    child: &str,
) -> Result<Vec<SiblingOverlap>, AttributionError> {
    let mut overlaps = Vec::new();
    for sibling in graph.children(parent) {
        if sibling == child {
            continue;
        }
        let found = overlap(graph, attribution, parent, child, sibling)?;
        if found.kind != OverlapKind::None {
            overlaps.push(found);
        }
    }
    Ok(overlaps)
}
