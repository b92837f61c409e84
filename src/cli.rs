//! CLI argument parsing for importcost

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for the report directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tree dump plus semicolon-delimited tables (default)
    Text,
    /// Text reports plus a result.json document
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "importcost")]
#[command(version)]
#[command(about = "Attribute module load time from an import-analyzer trace", long_about = None)]
pub struct Cli {
    /// Trace file produced by the import analyzer
    #[arg(short = 'f', long = "file", value_name = "TRACE")]
    pub file: PathBuf,

    /// Output directory for reports [default: ./result]
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Root-set file listing entry files (enables the entry report)
    #[arg(long = "entry", value_name = "FILE")]
    pub entry: Option<PathBuf>,

    /// Outside importers an entry descendant may have and still count
    #[arg(long = "share-count", value_name = "N")]
    pub share_count: Option<usize>,

    /// Root-set file listing test files (enables the test-set report)
    #[arg(long = "test", value_name = "FILE")]
    pub test: Option<PathBuf>,

    /// Directory components kept when grouping files into modules
    #[arg(long = "module-depth", value_name = "N")]
    pub module_depth: Option<usize>,

    /// Grouping point for the module report (repeatable)
    #[arg(long = "module-stop", value_name = "PATH")]
    pub module_stop: Vec<String>,

    /// TOML configuration file; flags override its values
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_trace_file() {
        assert!(Cli::try_parse_from(["importcost"]).is_err());
    }

    #[test]
    fn test_cli_parses_trace_file() {
        let cli = Cli::parse_from(["importcost", "-f", "trace.log"]);
        assert_eq!(cli.file, PathBuf::from("trace.log"));
        assert!(cli.output.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_entry_and_share_count() {
        let cli = Cli::parse_from([
            "importcost",
            "-f",
            "trace.log",
            "--entry",
            "entries.txt",
            "--share-count",
            "3",
        ]);
        assert_eq!(cli.entry, Some(PathBuf::from("entries.txt")));
        assert_eq!(cli.share_count, Some(3));
    }

    #[test]
    fn test_cli_module_stop_repeatable() {
        let cli = Cli::parse_from([
            "importcost",
            "-f",
            "t.log",
            "--module-stop",
            "src/a",
            "--module-stop",
            "src/b",
        ]);
        assert_eq!(cli.module_stop, vec!["src/a", "src/b"]);
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["importcost", "-f", "t.log", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_rejects_negative_share_count() {
        assert!(Cli::try_parse_from(["importcost", "-f", "t.log", "--share-count", "-1"]).is_err());
    }
}
