// Load-cost attribution over the file dependency graph
//
// Answers "how much load time does this file cost, including what it pulls
// in exclusively, and how much of it is shared with other importers?"
//
// Every report is the same classification run with a different root
// selector: whole tree (each importer, tolerance 0), entries (tolerance =
// share count) and test set (all tests as one pseudo-root).

mod engine;
mod overlap;
mod relation;
mod selector;

pub use engine::{attribute, AnnotatedChild, Attribution, RootCost};
pub use overlap::{overlap, sibling_overlaps, OverlapKind, SiblingOverlap};
pub use relation::{RelationIndex, RelationKind, RelationMap};
pub use selector::{RootMode, RootSelector};

use crate::dependency_graph::DependencyGraph;
use rayon::prelude::*;
use thiserror::Error;

/// Fatal attribution failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributionError {
    #[error("root '{root}' is not in the dependency graph")]
    UnknownRoot { root: String },

    #[error("'{descendant}' is still Unknown under root '{root}' after classification")]
    UnresolvedRelation { root: String, descendant: String },

    #[error("'{child}' is not a child of '{parent}'")]
    NotSiblings { parent: String, child: String },
}

/// Run several selectors against one graph
///
/// The graph is only read, and each selector writes its own relation
/// index, so the queries run in parallel. Results keep selector order.
pub fn attribute_all(
    graph: &DependencyGraph,
    selectors: &[RootSelector],
) -> Result<Vec<Attribution>, AttributionError> {
    selectors
        .par_iter()
        .map(|selector| attribute(graph, selector))
        .collect()
}
