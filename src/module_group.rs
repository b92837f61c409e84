//! Module-path bucketing for the per-module report
//!
//! Files are grouped under a "grouping point": the longest configured stop
//! path that prefixes the file, or, when no stop path applies, the first
//! `depth` directory components. Each group is then attributed as a single
//! pseudo-root.

use crate::attribution::RootSelector;
use crate::dependency_graph::DependencyGraph;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrouper {
    depth: usize,
    stop_paths: Vec<String>,
}

impl ModuleGrouper {
    pub fn new(depth: usize, stop_paths: Vec<String>) -> Self {
        let stop_paths = stop_paths
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { depth, stop_paths }
    }

    /// Grouping point for `path`
    pub fn module_of(&self, path: &str) -> String {
        if let Some(stop) = self.stop_path_of(path) {
            return stop.to_string();
        }

        let dirs: Vec<&str> = match path.rsplit_once('/') {
            Some((dir, _file)) => dir.split('/').filter(|c| !c.is_empty()).collect(),
            None => Vec::new(),
        };
        if dirs.is_empty() {
            return ".".to_string();
        }

        let prefix = if path.starts_with('/') { "/" } else { "" };
        format!("{}{}", prefix, dirs[..dirs.len().min(self.depth)].join("/"))
    }

    fn stop_path_of(&self, path: &str) -> Option<&str> {
        self.stop_paths
            .iter()
            .filter(|stop| {
                path.strip_prefix(stop.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
            .max_by_key(|stop| stop.len())
            .map(String::as_str)
    }

    /// Files per grouping point, in trace order
    ///
    /// With stop paths configured only files under one of them are grouped.
    pub fn group(&self, graph: &DependencyGraph) -> IndexMap<String, Vec<String>> {
        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for id in graph.ids() {
            if !self.stop_paths.is_empty() && self.stop_path_of(id).is_none() {
                continue;
            }
            groups
                .entry(self.module_of(id))
                .or_default()
                .push(id.to_string());
        }
        groups
    }

    /// One combined selector per grouping point
    pub fn selectors(&self, graph: &DependencyGraph) -> Vec<RootSelector> {
        self.group(graph)
            .into_iter()
            .map(|(module, files)| RootSelector::combined(module, files, 0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace_record::TraceParser;

    #[test]
    fn test_depth_bucketing() {
        let grouper = ModuleGrouper::new(2, vec![]);
        assert_eq!(grouper.module_of("src/main/ets/pages/Index.ets"), "src/main");
        assert_eq!(grouper.module_of("src/Index.ets"), "src");
        assert_eq!(grouper.module_of("Index.ets"), ".");
        assert_eq!(grouper.module_of("/abs/dir/x/y.js"), "/abs/dir");
    }

    #[test]
    fn test_longest_stop_path_wins() {
        let grouper = ModuleGrouper::new(
            1,
            vec!["src/main".to_string(), "src/main/ets/pages/".to_string()],
        );
        assert_eq!(
            grouper.module_of("src/main/ets/pages/Index.ets"),
            "src/main/ets/pages"
        );
        assert_eq!(grouper.module_of("src/main/ets/common/Log.ets"), "src/main");
    }

    #[test]
    fn test_stop_path_matches_whole_components() {
        let grouper = ModuleGrouper::new(1, vec!["src/ma".to_string()]);
        assert_eq!(grouper.module_of("src/main/a.js"), "src");
    }

    #[test]
    fn test_group_restricted_to_stop_paths() {
        let trace = "\
used file 1: lib/a/x.js, cost time: 1ms
used file 2: lib/b/y.js, cost time: 1ms
used file 3: app/z.js, cost time: 1ms
";
        let records = TraceParser::new().unwrap().parse_str(trace).unwrap();
        let graph = DependencyGraph::from_records(records).unwrap();

        let all = ModuleGrouper::new(1, vec![]).group(&graph);
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["lib", "app"]);
        assert_eq!(all["lib"].len(), 2);

        let restricted = ModuleGrouper::new(1, vec!["lib/b".to_string()]);
        let selectors = restricted.selectors(&graph);
        assert_eq!(selectors.len(), 1);
        assert_eq!(selectors[0].name, "lib/b");
        assert_eq!(selectors[0].roots, vec!["lib/b/y.js"]);
    }
}
