//! End-to-end analysis: trace file in, report directory out
//!
//! ```text
//! trace ──► TraceParser ──► GraphBuilder ──► attribute_all ──► reports
//!                                             │
//!            tree / entry / test / module selectors
//! ```

use crate::attribution::{attribute_all, Attribution, RootSelector};
use crate::cli::OutputFormat;
use crate::config::AnalyzerConfig;
use crate::dependency_graph::DependencyGraph;
use crate::module_group::ModuleGrouper;
use crate::report::{self, JsonOutput};
use crate::root_set::RootSet;
use crate::stats::TraceStats;
use crate::trace_record::TraceParser;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Parse a trace file and build its dependency graph
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<DependencyGraph> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open trace file: {}", path.display()))?;

    let parser = TraceParser::new()?;
    let records = parser
        .parse_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse trace file: {}", path.display()))?;
    info!(records = records.len(), "trace parsed");

    let graph = DependencyGraph::from_records(records)
        .with_context(|| format!("Failed to build dependency graph: {}", path.display()))?;
    info!(
        files = graph.len(),
        edges = graph.edge_count(),
        "dependency graph built"
    );
    Ok(graph)
}

/// A selector together with its result
#[derive(Debug, Clone)]
pub struct SelectorResult {
    pub selector: RootSelector,
    pub attribution: Attribution,
}

/// Every attribution the reports need
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub stats: TraceStats,
    pub tree: Attribution,
    pub entries: Option<SelectorResult>,
    pub tests: Option<SelectorResult>,
    pub modules: IndexMap<String, Vec<String>>,
    pub module_costs: Vec<Attribution>,
}

impl Analysis {
    /// Run the whole-tree, entry, test-set and module selectors
    pub fn run(graph: DependencyGraph, config: &AnalyzerConfig) -> Result<Self> {
        let entry_selector = match &config.entry_file {
            Some(path) => non_empty(RootSelector::entries(
                &graph,
                &RootSet::from_file(path)?,
                config.share_tolerance,
            )),
            None => None,
        };
        let test_selector = match &config.test_file {
            Some(path) => non_empty(RootSelector::test_set(&graph, &RootSet::from_file(path)?)),
            None => None,
        };

        let grouper = ModuleGrouper::new(config.module_depth, config.module_stop_paths.clone());
        let modules = grouper.group(&graph);

        let mut selectors = vec![RootSelector::whole_tree(&graph)];
        selectors.extend(entry_selector.iter().cloned());
        selectors.extend(test_selector.iter().cloned());
        selectors.extend(grouper.selectors(&graph));

        let mut results = attribute_all(&graph, &selectors)
            .context("Load-cost attribution failed")?
            .into_iter();
        info!(selectors = selectors.len(), "attribution complete");

        let tree = results
            .next()
            .context("whole-tree attribution missing from results")?;
        let entries = pair(entry_selector, &mut results)?;
        let tests = pair(test_selector, &mut results)?;
        let module_costs: Vec<Attribution> = results.collect();

        Ok(Self {
            stats: TraceStats::from_graph(&graph),
            graph,
            tree,
            entries,
            tests,
            modules,
            module_costs,
        })
    }

    /// Write every report into `dir`
    pub fn write_reports(&self, dir: &Path, format: OutputFormat) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let tree = report::render_tree(&self.graph, &self.tree)?;
        written.push(report::write_report(dir, report::TREE_FILE, &tree)?);

        let costs = report::cost_table(&self.graph, &self.tree)?;
        written.push(report::write_report(dir, report::COST_FILE, &costs.to_csv())?);

        if let Some(entries) = &self.entries {
            let table = report::entry_table(&entries.attribution);
            written.push(report::write_report(dir, report::ENTRY_FILE, &table.to_csv())?);
        }

        if !self.modules.is_empty() {
            let table = report::module_table(&self.modules, &self.module_costs);
            written.push(report::write_report(dir, report::MODULE_FILE, &table.to_csv())?);
        }

        if let Some(tests) = &self.tests {
            let table = report::test_table(&self.graph, &tests.selector, &tests.attribution);
            written.push(report::write_report(dir, report::TEST_FILE, &table.to_csv())?);
        }

        if format == OutputFormat::Json {
            let others: Vec<&Attribution> = self
                .entries
                .iter()
                .chain(self.tests.iter())
                .map(|r| &r.attribution)
                .collect();
            let document = JsonOutput::new(&self.graph, &self.tree, &others, &self.stats)?
                .to_json()
                .context("Failed to serialize JSON report")?;
            written.push(report::write_report(dir, report::JSON_FILE, &document)?);
        }

        Ok(written)
    }
}

fn non_empty(selector: RootSelector) -> Option<RootSelector> {
    if selector.is_empty() {
        warn!(selector = %selector.name, "no file in the trace matches the root set");
        None
    } else {
        Some(selector)
    }
}

fn pair(
    selector: Option<RootSelector>,
    results: &mut impl Iterator<Item = Attribution>,
) -> Result<Option<SelectorResult>> {
    selector
        .map(|selector| {
            let attribution = results
                .next()
                .with_context(|| format!("attribution for '{}' missing", selector.name))?;
            Ok(SelectorResult {
                selector,
                attribution,
            })
        })
        .transpose()
}

/// Load, attribute and report in one call
pub fn run(trace: &Path, config: &AnalyzerConfig) -> Result<Analysis> {
    let graph = load_graph(trace)?;
    let analysis = Analysis::run(graph, config)?;
    let written = analysis.write_reports(&config.output_dir, config.format)?;
    info!(
        reports = written.len(),
        dir = %config.output_dir.display(),
        "analysis finished"
    );
    Ok(analysis)
}
