//! Report projections of an attributed graph
//!
//! Each report is rendered to a `String` first and written by
//! [`write_report`], so the formatters stay free of I/O.

pub mod csv_output;
pub mod json_output;
pub mod tree;

pub use csv_output::{cost_table, entry_table, module_table, test_table, CsvTable};
pub use json_output::JsonOutput;
pub use tree::render_tree;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TREE_FILE: &str = "result_tree";
pub const COST_FILE: &str = "result_cost.csv";
pub const ENTRY_FILE: &str = "result_entry.csv";
pub const MODULE_FILE: &str = "result_module.csv";
pub const TEST_FILE: &str = "result_test.csv";
pub const JSON_FILE: &str = "result.json";

/// Write `content` to `dir/name`, creating `dir` if needed
pub fn write_report(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    info!(report = %path.display(), bytes = content.len(), "report written");
    Ok(path)
}
