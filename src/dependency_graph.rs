//! Dependency graph construction from trace records
//!
//! The builder is a fold over the ordered record stream. A `used`/`unused`
//! record opens a "current file"; following `parentModule` records add
//! `parent -> current` edges until the next load record or separator.
//!
//! # Node lifecycle
//!
//! ```text
//! parentModule X  (X unseen)     ──► X created as Placeholder
//! used file X     (X Placeholder) ──► X upgraded in place, edges kept
//! used file X     (X Used/Unused) ──► DuplicateFile error
//! ```
//!
//! Edges are always inserted as a pair (`parent.children[child]` and
//! `child.parents[parent]`), so the two adjacency maps never disagree.
//! Every map is an [`IndexMap`], which keeps iteration in trace order.

use crate::trace_record::{FileKind, TraceRecord};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors raised while folding records into a graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("line {line}: duplicated {kind} file: {path}")]
    DuplicateFile {
        path: String,
        kind: FileKind,
        line: usize,
    },

    #[error("line {line}: no current file found for parent module parsing")]
    ParentWithoutContext { line: usize },
}

/// Symbols imported through one parent edge
///
/// `None` means the parent imported the whole module.
pub type ImportedSymbols = Option<IndexSet<String>>;

/// Edge-level record stored on the parent side
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChildEdge {
    pub kind: FileKind,
}

/// One file mentioned anywhere in the trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub id: String,
    pub kind: FileKind,
    /// Sequence number from the trace line; zero for placeholders
    pub sequence: u64,
    /// Milliseconds spent loading this file alone
    pub self_cost: f64,
    pub parents: IndexMap<String, ImportedSymbols>,
    pub children: IndexMap<String, ChildEdge>,
}

impl FileNode {
    fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: FileKind::Placeholder,
            sequence: 0,
            self_cost: 0.0,
            parents: IndexMap::new(),
            children: IndexMap::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == FileKind::Placeholder
    }
}

/// Complete file graph for one trace
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyGraph {
    nodes: IndexMap<String, FileNode>,
}

impl DependencyGraph {
    /// Build a graph from `(line_number, record)` pairs
    ///
    /// # Example
    ///
    /// ```
    /// use importcost::dependency_graph::DependencyGraph;
    /// use importcost::trace_record::TraceParser;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let trace = "used file 1: a.js, cost time: 10ms\nparentModule 1: b.js\n";
    /// let records = TraceParser::new()?.parse_str(trace)?;
    /// let graph = DependencyGraph::from_records(records)?;
    ///
    /// assert_eq!(graph.len(), 2);
    /// assert!(graph.node("b.js").unwrap().is_placeholder());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_records<I>(records: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, TraceRecord)>,
    {
        let mut builder = GraphBuilder::new();
        for (line, record) in records {
            builder.push(line, record)?;
        }
        Ok(builder.finish())
    }

    pub fn node(&self, id: &str) -> Option<&FileNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in first-mention order
    pub fn nodes(&self) -> impl Iterator<Item = &FileNode> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Nodes nobody imports
    pub fn top_level(&self) -> impl Iterator<Item = &FileNode> {
        self.nodes.values().filter(|n| n.parents.is_empty())
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.children.len()).sum()
    }

    /// Self cost of `id`, zero when the id is unknown
    pub fn self_cost(&self, id: &str) -> f64 {
        self.nodes.get(id).map_or(0.0, |n| n.self_cost)
    }

    /// Kind of `id`, `None` when the id is unknown
    pub fn kind_of(&self, id: &str) -> Option<FileKind> {
        self.nodes.get(id).map(|n| n.kind)
    }

    pub fn children(&self, id: &str) -> impl Iterator<Item = &str> {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|n| n.children.keys().map(String::as_str))
    }

    pub fn parents(&self, id: &str) -> impl Iterator<Item = &str> {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|n| n.parents.keys().map(String::as_str))
    }
}

/// Incremental graph builder
///
/// Holds the "current file" context that `parentModule` records attach to.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: IndexMap<String, FileNode>,
    current: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one record
    pub fn push(&mut self, line: usize, record: TraceRecord) -> Result<(), GraphError> {
        match record {
            TraceRecord::Load {
                kind,
                sequence,
                path,
                cost_ms,
            } => {
                let kind = FileKind::from(kind);
                let node = self
                    .nodes
                    .entry(path.clone())
                    .or_insert_with(|| FileNode::placeholder(&path));
                if !node.is_placeholder() {
                    return Err(GraphError::DuplicateFile { path, kind, line });
                }
                node.kind = kind;
                node.sequence = sequence;
                node.self_cost = cost_ms;
                self.current = Some(path);
            }
            TraceRecord::Parent { path, symbol, .. } => {
                let Some(current) = self.current.clone() else {
                    return Err(GraphError::ParentWithoutContext { line });
                };
                self.add_edge(&path, &current, symbol);
            }
            TraceRecord::Separator => {
                self.current = None;
            }
        }
        Ok(())
    }

    fn add_edge(&mut self, parent: &str, child: &str, symbol: Option<String>) {
        if !self.nodes.contains_key(parent) {
            debug!(parent, child, "forward parent reference, creating placeholder");
            self.nodes
                .insert(parent.to_string(), FileNode::placeholder(parent));
        }

        if let Some(child_node) = self.nodes.get_mut(child) {
            let symbols = child_node.parents.entry(parent.to_string()).or_insert(None);
            match symbol {
                Some(symbol) => {
                    symbols.get_or_insert_with(IndexSet::new).insert(symbol);
                }
                None => *symbols = None,
            }
        }

        // Child kind is stamped at finish(); the child may still be upgraded.
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node
                .children
                .entry(child.to_string())
                .or_insert(ChildEdge {
                    kind: FileKind::Placeholder,
                });
        }
    }

    /// Close the fold and produce the graph
    pub fn finish(self) -> DependencyGraph {
        let mut nodes = self.nodes;

        let kinds: IndexMap<String, FileKind> = nodes
            .iter()
            .map(|(id, node)| (id.clone(), node.kind))
            .collect();
        for node in nodes.values_mut() {
            for (child, edge) in node.children.iter_mut() {
                if let Some(kind) = kinds.get(child) {
                    edge.kind = *kind;
                }
            }
        }

        debug!(nodes = nodes.len(), "dependency graph built");
        DependencyGraph { nodes }
    }
}
