#![no_main]

use importcost::attribution::{attribute, RootSelector};
use importcost::dependency_graph::DependencyGraph;
use importcost::trace_record::TraceParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(parser) = TraceParser::new() else {
        return;
    };

    // Malformed traces must be rejected with an error, never a panic
    let Ok(records) = parser.parse_str(input) else {
        return;
    };
    let Ok(graph) = DependencyGraph::from_records(records) else {
        return;
    };

    let _ = attribute(&graph, &RootSelector::whole_tree(&graph));
});
