//! JSON report (`result.json`, `--format json`)

use crate::attribution::{Attribution, AttributionError, RootCost};
use crate::dependency_graph::DependencyGraph;
use crate::stats::TraceStats;
use crate::trace_record::FileKind;
use serde::{Deserialize, Serialize};

/// One file with its whole-tree cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonNode {
    pub file: String,
    pub kind: FileKind,
    pub self_cost: f64,
    pub cost: f64,
    pub parents: Vec<JsonParent>,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonParent {
    pub file: String,
    /// Imported symbols; absent for whole-module imports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
}

/// Rolled-up cost of one root under one selector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRootCost {
    pub root: String,
    pub total: f64,
    pub used: f64,
    pub unused: f64,
    pub single: usize,
    pub shared: usize,
}

impl JsonRootCost {
    fn new(root: &str, cost: &RootCost) -> Self {
        Self {
            root: root.to_string(),
            total: cost.total,
            used: cost.used,
            unused: cost.unused,
            single: cost.single_count,
            shared: cost.shared_count,
        }
    }
}

/// Costs of every root of one selector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAttribution {
    pub selector: String,
    pub share_tolerance: usize,
    pub roots: Vec<JsonRootCost>,
}

impl From<&Attribution> for JsonAttribution {
    fn from(attribution: &Attribution) -> Self {
        Self {
            selector: attribution.selector().to_string(),
            share_tolerance: attribution.share_tolerance(),
            roots: attribution
                .costs()
                .map(|(root, cost)| JsonRootCost::new(root, cost))
                .collect(),
        }
    }
}

/// Summary statistics for the trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    pub used_files: usize,
    pub unused_files: usize,
    pub placeholder_files: usize,
    pub used_cost: f64,
    pub unused_cost: f64,
    pub edges: usize,
}

impl From<&TraceStats> for JsonSummary {
    fn from(stats: &TraceStats) -> Self {
        Self {
            used_files: stats.used.files,
            unused_files: stats.unused.files,
            placeholder_files: stats.placeholder.files,
            used_cost: stats.used.cost_ms,
            unused_cost: stats.unused.cost_ms,
            edges: stats.edges,
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    pub version: String,
    pub format: String,
    pub nodes: Vec<JsonNode>,
    pub attributions: Vec<JsonAttribution>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document from the whole-tree attribution plus any others
    pub fn new(
        graph: &DependencyGraph,
        tree: &Attribution,
        others: &[&Attribution],
        stats: &TraceStats,
    ) -> Result<Self, AttributionError> {
        let nodes = graph
            .nodes()
            .map(|node| {
                Ok(JsonNode {
                    file: node.id.clone(),
                    kind: node.kind,
                    self_cost: node.self_cost,
                    cost: tree.edge_cost(graph, &node.id)?,
                    parents: node
                        .parents
                        .iter()
                        .map(|(file, symbols)| JsonParent {
                            file: file.clone(),
                            symbols: symbols.as_ref().map(|s| s.iter().cloned().collect()),
                        })
                        .collect(),
                    children: node.children.keys().cloned().collect(),
                })
            })
            .collect::<Result<Vec<_>, AttributionError>>()?;

        let attributions = std::iter::once(tree)
            .chain(others.iter().copied())
            .map(JsonAttribution::from)
            .collect();

        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "importcost-json-v1".to_string(),
            nodes,
            attributions,
            summary: JsonSummary::from(stats),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
