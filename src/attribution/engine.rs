// Two-phase ownership classification and cost rollup
//
// Phase 1 collects everything reachable from a root. Phase 2 counts, for
// every reachable file, the parents that lie outside the root's subtree
// ("external exposure"). Files exposed more than the share tolerance are
// Shared, and Shared spreads to everything below them inside the subtree.
// Whatever is left is Single and is charged to the root.

use super::relation::{RelationIndex, RelationKind, RelationMap};
use super::selector::{RootMode, RootSelector};
use super::AttributionError;
use crate::dependency_graph::DependencyGraph;
use crate::trace_record::FileKind;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, trace};

/// Rolled-up cost of one root (or pseudo-root)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RootCost {
    /// Root self cost plus every Single descendant's self cost
    pub total: f64,
    /// Part of `total` coming from `Used` files
    pub used: f64,
    /// Part of `total` coming from `Unused` files
    pub unused: f64,
    pub single_count: usize,
    pub shared_count: usize,
}

impl RootCost {
    fn charge(&mut self, kind: Option<FileKind>, cost: f64) {
        self.total += cost;
        match kind {
            Some(FileKind::Used) => self.used += cost,
            Some(FileKind::Unused) => self.unused += cost,
            Some(FileKind::Placeholder) | None => {}
        }
    }
}

/// Child edge with the child's own rolled-up cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedChild {
    pub id: String,
    pub kind: FileKind,
    pub cost: f64,
}

/// Result of one attribution query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    selector: String,
    share_tolerance: usize,
    mode: RootMode,
    relations: RelationIndex,
    costs: IndexMap<String, RootCost>,
}

impl Attribution {
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn share_tolerance(&self) -> usize {
        self.share_tolerance
    }

    pub fn relations(&self) -> &RelationIndex {
        &self.relations
    }

    /// Rolled-up cost of an attributed root
    pub fn cost_of(&self, root: &str) -> Option<f64> {
        self.costs.get(root).map(|c| c.total)
    }

    pub fn breakdown(&self, root: &str) -> Option<&RootCost> {
        self.costs.get(root)
    }

    pub fn costs(&self) -> impl Iterator<Item = (&str, &RootCost)> {
        self.costs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True when `descendant` is reachable from the attributed `root`
    pub fn reaches(&self, root: &str, descendant: &str) -> bool {
        self.relations.reaches(root, descendant)
    }

    pub fn mode(&self) -> RootMode {
        self.mode
    }

    /// Whether this result already holds edge-level costs: each root on
    /// its own at tolerance 0
    fn holds_edge_costs(&self) -> bool {
        self.mode == RootMode::PerRoot && self.share_tolerance == 0
    }

    /// `id` attributed alone at tolerance 0
    fn solo(graph: &DependencyGraph, id: &str) -> Result<Attribution, AttributionError> {
        attribute(graph, &RootSelector::per_root(id, vec![id.to_string()], 0))
    }

    /// Cost of `id` as its own root at tolerance 0
    ///
    /// Reused from this result when it was computed that way and holds
    /// `id`; otherwise `id` is attributed on demand. Files without
    /// children cost their self cost.
    pub fn edge_cost(&self, graph: &DependencyGraph, id: &str) -> Result<f64, AttributionError> {
        if self.holds_edge_costs() {
            if let Some(cost) = self.cost_of(id) {
                return Ok(cost);
            }
        }
        Ok(Self::solo(graph, id)?.cost_of(id).unwrap_or_default())
    }

    /// True when `to` is reachable from `from` taken as its own root
    pub fn edge_reaches(
        &self,
        graph: &DependencyGraph,
        from: &str,
        to: &str,
    ) -> Result<bool, AttributionError> {
        if self.holds_edge_costs() && self.relations.contains_root(from) {
            return Ok(self.reaches(from, to));
        }
        Ok(Self::solo(graph, from)?.reaches(from, to))
    }

    /// Children of `id`, each carrying its own tolerance-0 cost
    pub fn annotated_children(
        &self,
        graph: &DependencyGraph,
        id: &str,
    ) -> Result<Vec<AnnotatedChild>, AttributionError> {
        let Some(node) = graph.node(id) else {
            return Ok(Vec::new());
        };
        node.children
            .iter()
            .map(|(child, edge)| {
                Ok(AnnotatedChild {
                    id: child.clone(),
                    kind: edge.kind,
                    cost: self.edge_cost(graph, child)?,
                })
            })
            .collect()
    }
}

/// Attribute load cost to the roots named by `selector`
///
/// # Errors
///
/// - [`AttributionError::UnknownRoot`] if a root is not in the graph
/// - [`AttributionError::UnresolvedRelation`] if classification leaves a
///   descendant `Unknown`
///
/// # Example
///
/// ```
/// use importcost::attribution::{attribute, RelationKind, RootSelector};
/// use importcost::dependency_graph::DependencyGraph;
/// use importcost::trace_record::TraceParser;
///
/// # fn main() -> anyhow::Result<()> {
/// let trace = "\
/// used file 1: A, cost time: 10ms
/// parentModule 1: B
/// used file 2: B, cost time: 5ms
/// ";
/// let graph = DependencyGraph::from_records(TraceParser::new()?.parse_str(trace)?)?;
/// let selector = RootSelector::per_root("demo", vec!["B".to_string()], 0);
/// let result = attribute(&graph, &selector)?;
///
/// assert_eq!(result.cost_of("B"), Some(15.0));
/// assert_eq!(result.relations().relation("B", "A"), Some(RelationKind::Single));
/// # Ok(())
/// # }
/// ```
pub fn attribute(
    graph: &DependencyGraph,
    selector: &RootSelector,
) -> Result<Attribution, AttributionError> {
    for root in &selector.roots {
        if !graph.contains(root) {
            return Err(AttributionError::UnknownRoot { root: root.clone() });
        }
    }

    let mut relations = RelationIndex::new();
    let mut costs = IndexMap::new();

    match selector.mode {
        RootMode::PerRoot => {
            for root in &selector.roots {
                let members: IndexSet<&str> = std::iter::once(root.as_str()).collect();
                let map = classify(graph, root, &members, selector.share_tolerance)?;
                costs.insert(root.clone(), rollup(graph, &members, &map));
                relations.insert(root.clone(), map);
            }
        }
        RootMode::Combined => {
            let members: IndexSet<&str> = selector.roots.iter().map(String::as_str).collect();
            let map = classify(graph, &selector.name, &members, selector.share_tolerance)?;
            costs.insert(selector.name.clone(), rollup(graph, &members, &map));
            relations.insert(selector.name.clone(), map);
        }
    }

    debug!(
        selector = %selector.name,
        roots = selector.roots.len(),
        tolerance = selector.share_tolerance,
        "attribution complete"
    );

    Ok(Attribution {
        selector: selector.name.clone(),
        share_tolerance: selector.share_tolerance,
        mode: selector.mode,
        relations,
        costs,
    })
}

/// Phase 1: everything reachable from `members`, excluding the members
fn reachable(graph: &DependencyGraph, members: &IndexSet<&str>) -> RelationMap {
    let mut found = RelationMap::new();
    let mut stack: Vec<&str> = Vec::new();

    for member in members.iter().rev() {
        let children: Vec<&str> = graph.children(member).collect();
        stack.extend(children.into_iter().rev());
    }

    while let Some(id) = stack.pop() {
        if members.contains(id) || found.contains_key(id) {
            continue;
        }
        found.insert(id.to_string(), RelationKind::Unknown);

        let children: Vec<&str> = graph.children(id).collect();
        for child in children.into_iter().rev() {
            if !members.contains(child) && !found.contains_key(child) {
                stack.push(child);
            }
        }
    }

    found
}

/// Phase 2: classify every reachable descendant
fn classify(
    graph: &DependencyGraph,
    key: &str,
    members: &IndexSet<&str>,
    tolerance: usize,
) -> Result<RelationMap, AttributionError> {
    let mut relations = reachable(graph, members);

    let exposure: IndexMap<String, usize> = relations
        .keys()
        .map(|id| {
            let external = graph
                .parents(id)
                .filter(|p| !members.contains(p) && !relations.contains_key(*p))
                .count();
            (id.clone(), external)
        })
        .collect();

    // Shared seeds, then spread through the subtree
    let mut worklist: Vec<String> = exposure
        .iter()
        .filter(|(_, &external)| external > tolerance)
        .map(|(id, _)| id.clone())
        .collect();

    while let Some(id) = worklist.pop() {
        match relations.get_mut(&id) {
            Some(kind) if *kind != RelationKind::Shared => *kind = RelationKind::Shared,
            _ => continue,
        }
        trace!(root = key, file = %id, "shared");
        for child in graph.children(&id) {
            if relations
                .get(child)
                .is_some_and(|kind| *kind != RelationKind::Shared)
            {
                worklist.push(child.to_string());
            }
        }
    }

    for (id, kind) in relations.iter_mut() {
        if *kind == RelationKind::Unknown && exposure.get(id).is_some_and(|e| *e <= tolerance) {
            *kind = RelationKind::Single;
        }
    }

    if let Some((id, _)) = relations
        .iter()
        .find(|(_, kind)| **kind == RelationKind::Unknown)
    {
        return Err(AttributionError::UnresolvedRelation {
            root: key.to_string(),
            descendant: id.clone(),
        });
    }

    Ok(relations)
}

fn rollup(graph: &DependencyGraph, members: &IndexSet<&str>, relations: &RelationMap) -> RootCost {
    let mut cost = RootCost::default();

    for member in members {
        cost.charge(graph.kind_of(member), graph.self_cost(member));
    }

    for (id, kind) in relations {
        match kind {
            RelationKind::Single => {
                cost.single_count += 1;
                cost.charge(graph.kind_of(id), graph.self_cost(id));
            }
            RelationKind::Shared => cost.shared_count += 1,
            RelationKind::Unknown => {}
        }
    }

    cost
}
