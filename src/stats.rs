//! Trace statistics summary
//!
//! Per-kind file counts and load time, printed to stderr at the end of a
//! run in the same spirit as `strace -c`.

use crate::dependency_graph::DependencyGraph;
use crate::trace_record::FileKind;
use serde::Serialize;

/// Totals for one file kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KindStats {
    pub files: usize,
    pub cost_ms: f64,
}

/// Summary of a parsed trace
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceStats {
    pub used: KindStats,
    pub unused: KindStats,
    pub placeholder: KindStats,
    pub edges: usize,
    pub top_level: usize,
}

impl TraceStats {
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        let mut stats = Self {
            edges: graph.edge_count(),
            top_level: graph.top_level().count(),
            ..Self::default()
        };

        for node in graph.nodes() {
            let entry = match node.kind {
                FileKind::Used => &mut stats.used,
                FileKind::Unused => &mut stats.unused,
                FileKind::Placeholder => &mut stats.placeholder,
            };
            entry.files += 1;
            entry.cost_ms += node.self_cost;
        }

        stats
    }

    pub fn total_files(&self) -> usize {
        self.used.files + self.unused.files + self.placeholder.files
    }

    pub fn total_cost_ms(&self) -> f64 {
        self.used.cost_ms + self.unused.cost_ms
    }

    /// Render the summary table
    pub fn summary_table(&self) -> String {
        let total = self.total_cost_ms();
        let percent = |cost: f64| {
            if total > 0.0 {
                cost / total * 100.0
            } else {
                0.0
            }
        };

        let mut out = String::new();
        out.push_str("% time      cost(ms)     files kind\n");
        out.push_str("------ ------------- --------- ----------------\n");
        for (label, kind) in [
            ("used", &self.used),
            ("unused", &self.unused),
            ("temp", &self.placeholder),
        ] {
            out.push_str(&format!(
                "{:6.2} {:>13.3} {:>9} {}\n",
                percent(kind.cost_ms),
                kind.cost_ms,
                kind.files,
                label
            ));
        }
        out.push_str("------ ------------- --------- ----------------\n");
        out.push_str(&format!(
            "100.00 {:>13.3} {:>9} total ({} edges, {} top-level)\n",
            total,
            self.total_files(),
            self.edges,
            self.top_level
        ));
        out
    }

    pub fn print_summary(&self) {
        if self.total_files() == 0 {
            eprintln!("No files traced.");
            return;
        }
        eprint!("{}", self.summary_table());
    }
}
