//! importcost - load-cost attribution for import-analyzer traces
//!
//! This library turns the flat log written by a module loader's import
//! analyzer into a file dependency graph, then answers "how much load time
//! is attributable to this file (or set of files)?" for whole trees, entry
//! files, test suites and module directories.

pub mod analyzer;
pub mod attribution;
pub mod cli;
pub mod config;
pub mod dependency_graph;
pub mod module_group;
pub mod report;
pub mod root_set;
pub mod stats;
pub mod trace_record;
