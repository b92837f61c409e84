//! Semicolon-delimited report tables
//!
//! `result_cost.csv`, `result_entry.csv`, `result_module.csv` and
//! `result_test.csv` share one formatter; only the rows differ.

use crate::attribution::{Attribution, AttributionError, RelationKind, RootCost, RootSelector};
use crate::dependency_graph::DependencyGraph;
use indexmap::IndexMap;

const DELIMITER: char = ';';

/// One report table
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    header: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(header: Vec<&'static str>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Quote fields containing the delimiter, quotes or newlines
    fn escape_field(field: &str) -> String {
        if field.contains(DELIMITER) || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    pub fn to_csv(&self) -> String {
        let delimiter = DELIMITER.to_string();
        let mut output = self.header.join(&delimiter);
        output.push('\n');

        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(|f| Self::escape_field(f)).collect();
            output.push_str(&fields.join(&delimiter));
            output.push('\n');
        }

        output
    }
}

fn cost_fields(cost: &RootCost) -> [String; 3] {
    [
        cost.total.to_string(),
        cost.used.to_string(),
        cost.unused.to_string(),
    ]
}

/// `Type;File;Cost;Parent;Children` for every file in trace order
pub fn cost_table(
    graph: &DependencyGraph,
    tree: &Attribution,
) -> Result<CsvTable, AttributionError> {
    let mut table = CsvTable::new(vec!["Type", "File", "Cost", "Parent", "Children"]);
    for node in graph.nodes() {
        table.push_row(vec![
            node.kind.to_string(),
            node.id.clone(),
            tree.edge_cost(graph, &node.id)?.to_string(),
            node.parents.len().to_string(),
            node.children.len().to_string(),
        ]);
    }
    Ok(table)
}

/// `File;Cost;UsedCost;UnusedCost` per entry, heaviest first
pub fn entry_table(entries: &Attribution) -> CsvTable {
    let mut table = CsvTable::new(vec!["File", "Cost", "UsedCost", "UnusedCost"]);

    let mut costs: Vec<(&str, &RootCost)> = entries.costs().collect();
    costs.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));

    for (file, cost) in costs {
        let mut row = vec![file.to_string()];
        row.extend(cost_fields(cost));
        table.push_row(row);
    }
    table
}

/// `Module;Files;Cost;UsedCost;UnusedCost` per grouping point
///
/// `modules` must line up with the attributions produced from
/// [`crate::module_group::ModuleGrouper::selectors`].
pub fn module_table(
    modules: &IndexMap<String, Vec<String>>,
    attributions: &[Attribution],
) -> CsvTable {
    let mut table = CsvTable::new(vec!["Module", "Files", "Cost", "UsedCost", "UnusedCost"]);
    for ((module, files), attribution) in modules.iter().zip(attributions) {
        let Some(cost) = attribution.breakdown(module) else {
            continue;
        };
        let mut row = vec![module.clone(), files.len().to_string()];
        row.extend(cost_fields(cost));
        table.push_row(row);
    }
    table
}

/// `File;Type;SelfCost` for the test closure followed by a `Total` line
///
/// The closure is the test files themselves plus every descendant owned
/// by the test set as a whole.
pub fn test_table(
    graph: &DependencyGraph,
    selector: &RootSelector,
    tests: &Attribution,
) -> CsvTable {
    let mut table = CsvTable::new(vec!["File", "Type", "SelfCost"]);

    let owned = tests
        .relations()
        .with_kind(&selector.name, RelationKind::Single);
    for file in selector.roots.iter().map(String::as_str).chain(owned) {
        let kind = graph
            .kind_of(file)
            .map_or_else(|| "Unknown".to_string(), |k| k.to_string());
        table.push_row(vec![
            file.to_string(),
            kind,
            graph.self_cost(file).to_string(),
        ]);
    }

    let total = tests.cost_of(&selector.name).unwrap_or(0.0);
    table.push_row(vec!["Total".to_string(), String::new(), total.to_string()]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::attribute;
    use crate::module_group::ModuleGrouper;
    use crate::root_set::RootSet;
    use crate::trace_record::TraceParser;

    fn graph() -> DependencyGraph {
        let trace = "\
used file 1: app/main.js, cost time: 1ms
used file 2: app/a.js, cost time: 4ms
parentModule 2: app/main.js
unused file 3: lib/b.js, cost time: 2ms
parentModule 3: app/a.js
used file 4: test/a.test.js, cost time: 3ms
used file 5: lib/c.js, cost time: 5ms
parentModule 5: test/a.test.js
parentModule 5: app/a.js
";
        let records = TraceParser::new().unwrap().parse_str(trace).unwrap();
        DependencyGraph::from_records(records).unwrap()
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(CsvTable::escape_field("plain"), "plain");
        assert_eq!(CsvTable::escape_field("a;b"), "\"a;b\"");
        assert_eq!(CsvTable::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_cost_table() {
        let graph = graph();
        let tree = attribute(&graph, &RootSelector::whole_tree(&graph)).unwrap();
        let csv = cost_table(&graph, &tree).unwrap().to_csv();

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Type;File;Cost;Parent;Children"));
        assert_eq!(lines.next(), Some("Used;app/main.js;7;0;1"));
        assert_eq!(lines.next(), Some("Used;app/a.js;6;1;2"));
        assert_eq!(lines.next(), Some("Unused;lib/b.js;2;1;0"));
    }

    #[test]
    fn test_entry_table_sorted_by_cost() {
        let graph = graph();
        let selector = RootSelector::entries(&graph, &RootSet::parse("app/\n"), 0);
        let entries = attribute(&graph, &selector).unwrap();
        let csv = entry_table(&entries).to_csv();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "File;Cost;UsedCost;UnusedCost");
        assert_eq!(lines[1], "app/main.js;7;5;2");
        assert_eq!(lines[2], "app/a.js;6;4;2");
    }

    #[test]
    fn test_module_table() {
        let graph = graph();
        let grouper = ModuleGrouper::new(1, vec![]);
        let modules = grouper.group(&graph);
        let attributions: Vec<Attribution> = grouper
            .selectors(&graph)
            .iter()
            .map(|s| attribute(&graph, s).unwrap())
            .collect();
        let csv = module_table(&modules, &attributions).to_csv();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Module;Files;Cost;UsedCost;UnusedCost");
        assert_eq!(lines[1], "app;2;7;5;2");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_test_table_closure_and_total() {
        let graph = graph();
        let selector = RootSelector::test_set(&graph, &RootSet::parse("test/\n"));
        let tests = attribute(&graph, &selector).unwrap();
        let table = test_table(&graph, &selector, &tests);
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        let csv = table.to_csv();

        // lib/c.js is also imported by app/a.js, so it is not owned
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec!["File;Type;SelfCost", "test/a.test.js;Used;3", "Total;;3"]
        );
    }
}
