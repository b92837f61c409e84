//! Analyzer configuration
//!
//! Settings can come from a TOML file (`--config`) and are overridden by
//! command-line flags.
//!
//! ```toml
//! share_tolerance = 2
//! module_depth = 4
//! module_stop_paths = ["src/main/ets/pages", "oh_modules/@ohos"]
//! entry_file = "entries.txt"
//! test_file = "tests.txt"
//! output_dir = "./result"
//! format = "json"
//! ```

use crate::cli::{Cli, OutputFormat};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Outside importers an entry descendant may have and still count
    pub share_tolerance: usize,

    /// Directory components kept when bucketing files into modules
    pub module_depth: usize,

    /// Grouping points for the module report
    pub module_stop_paths: Vec<String>,

    /// Root-set file listing entry files
    pub entry_file: Option<PathBuf>,

    /// Root-set file listing test files
    pub test_file: Option<PathBuf>,

    pub output_dir: PathBuf,

    pub format: OutputFormat,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            share_tolerance: 0,
            module_depth: 3,
            module_stop_paths: Vec::new(),
            entry_file: None,
            test_file: None,
            output_dir: PathBuf::from("./result"),
            format: OutputFormat::Text,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config file (if any) with command-line flags layered on top
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_toml(path)?,
            None => Self::default(),
        };

        if let Some(count) = cli.share_count {
            config.share_tolerance = count;
        }
        if let Some(depth) = cli.module_depth {
            config.module_depth = depth;
        }
        if !cli.module_stop.is_empty() {
            config.module_stop_paths = cli.module_stop.clone();
        }
        if let Some(entry) = &cli.entry {
            config.entry_file = Some(entry.clone());
        }
        if let Some(test) = &cli.test {
            config.test_file = Some(test.clone());
        }
        if let Some(output) = &cli.output {
            config.output_dir = output.clone();
        }
        if let Some(format) = cli.format {
            config.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.module_depth == 0 {
            bail!("module_depth must be >= 1, got 0");
        }
        Ok(())
    }
}
