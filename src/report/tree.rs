//! Indented per-file tree dump (`result_tree`)
//!
//! ```text
//! (Used) pages/Index.ets 42.5
//!   Parents:
//!     |-> (Used) entry/EntryAbility.ets build
//!   Children:
//!     |-> (Used) common/Log.ets 3
//!       |-> (Shared) common/Util.ets 1.5
//! ```

use crate::attribution::{sibling_overlaps, Attribution, AttributionError};
use crate::dependency_graph::{DependencyGraph, FileNode};

const EMPTY: &str = "    |-> (Empty)\n";

/// Render every node of `graph` in trace order
///
/// Costs come from `attribution` when it holds tolerance-0 per-root
/// results (the whole-tree attribution does) and are computed otherwise.
pub fn render_tree(
    graph: &DependencyGraph,
    attribution: &Attribution,
) -> Result<String, AttributionError> {
    let mut out = String::new();
    for node in graph.nodes() {
        render_node(&mut out, graph, attribution, node)?;
    }
    Ok(out)
}

fn render_node(
    out: &mut String,
    graph: &DependencyGraph,
    attribution: &Attribution,
    node: &FileNode,
) -> Result<(), AttributionError> {
    out.push_str(&format!(
        "({}) {} {}\n",
        node.kind,
        node.id,
        attribution.edge_cost(graph, &node.id)?
    ));

    out.push_str("  Parents:\n");
    if node.parents.is_empty() {
        out.push_str(EMPTY);
    }
    for (parent, symbols) in &node.parents {
        let kind = graph
            .kind_of(parent)
            .map_or_else(|| "Unknown".to_string(), |k| k.to_string());
        out.push_str(&format!("    |-> ({}) {}", kind, parent));
        for symbol in symbols.iter().flatten() {
            out.push(' ');
            out.push_str(symbol);
        }
        out.push('\n');
    }

    out.push_str("  Children:\n");
    if node.children.is_empty() {
        out.push_str(EMPTY);
    }
    for child in attribution.annotated_children(graph, &node.id)? {
        out.push_str(&format!(
            "    |-> ({}) {} {}\n",
            child.kind, child.id, child.cost
        ));
        for friend in sibling_overlaps(graph, attribution, &node.id, &child.id)? {
            out.push_str(&format!(
                "      |-> ({}) {} {}\n",
                friend.kind, friend.sibling, friend.cost
            ));
        }
    }

    out.push_str("\n\n");
    Ok(())
}
