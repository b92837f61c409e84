//! Trace record model and line parser
//!
//! An import-analyzer trace is a flat, ordered log. Three line shapes carry
//! information:
//!
//! ```text
//! used file 12: src/main/ets/pages/Index.ets, cost time: 3.25ms
//! unused file 13: src/main/ets/common/Log.ets, cost time: 0.4ms
//! parentModule 12: src/main/ets/entry/Ability.ets Index
//! ```
//!
//! Every other line is a separator that closes the "current file" context.
//! `parentModule` lines attach to the most recent `used`/`unused` line, so
//! parsing is a small state machine over the line stream (see [`ParseState`]).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use thiserror::Error;

/// Errors raised while turning trace text into records
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("line {line}: parentModule record without a preceding used/unused file")]
    ParentWithoutContext { line: usize },

    #[error("line {line}: invalid cost time '{value}'")]
    InvalidCost { line: usize, value: String },

    #[error("line {line}: invalid sequence number '{value}'")]
    InvalidSequence { line: usize, value: String },

    #[error("failed to read trace")]
    Io(#[from] std::io::Error),

    #[error("invalid trace pattern")]
    Pattern(#[from] regex::Error),
}

/// Load outcome reported by the analyzer for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadKind {
    Used,
    Unused,
}

/// Kind of a file node in the dependency graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    /// Loaded and its exports were consumed
    Used,
    /// Loaded but nothing it exports was consumed
    Unused,
    /// Only ever referenced as somebody's parent; never loaded itself
    Placeholder,
}

impl From<LoadKind> for FileKind {
    fn from(kind: LoadKind) -> Self {
        match kind {
            LoadKind::Used => FileKind::Used,
            LoadKind::Unused => FileKind::Unused,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileKind::Used => "Used",
            FileKind::Unused => "Unused",
            FileKind::Placeholder => "Temp",
        };
        f.write_str(label)
    }
}

/// One parsed trace line
#[derive(Debug, Clone, PartialEq)]
pub enum TraceRecord {
    /// `used file N: path, cost time: Xms` or the `unused` variant
    Load {
        kind: LoadKind,
        sequence: u64,
        path: String,
        cost_ms: f64,
    },
    /// `parentModule N: path[ symbol]`
    Parent {
        sequence: u64,
        path: String,
        symbol: Option<String>,
    },
    /// Any line matching none of the above
    Separator,
}

/// Line-classification state
///
/// ```text
/// Init       -> OpenUsed | OpenUnused | Init
/// Open*      -> OpenUsed | OpenUnused | OpenParent | Init
/// Init       -> OpenParent   (rejected)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Init,
    OpenUsed,
    OpenUnused,
    OpenParent,
}

impl ParseState {
    /// Compute the state after consuming `record` found on `line`
    pub fn advance(self, record: &TraceRecord, line: usize) -> Result<Self, TraceError> {
        match record {
            TraceRecord::Load {
                kind: LoadKind::Used,
                ..
            } => Ok(ParseState::OpenUsed),
            TraceRecord::Load {
                kind: LoadKind::Unused,
                ..
            } => Ok(ParseState::OpenUnused),
            TraceRecord::Parent { .. } if self == ParseState::Init => {
                Err(TraceError::ParentWithoutContext { line })
            }
            TraceRecord::Parent { .. } => Ok(ParseState::OpenParent),
            TraceRecord::Separator => Ok(ParseState::Init),
        }
    }

    /// Whether a `parentModule` line may follow
    pub fn has_open_file(self) -> bool {
        self != ParseState::Init
    }
}

/// Compiled line patterns for the three record shapes
#[derive(Debug, Clone)]
pub struct TraceParser {
    used: Regex,
    unused: Regex,
    parent: Regex,
}

impl TraceParser {
    pub fn new() -> Result<Self, TraceError> {
        Ok(Self {
            used: Regex::new(r"used file (\d+): (.*), cost time: (.*)ms")?,
            unused: Regex::new(r"unused file (\d+): (.*), cost time: (.*)ms")?,
            parent: Regex::new(r"parentModule (\d+): (.*)")?,
        })
    }

    /// Classify a single line
    ///
    /// `line` is the 1-based line number used in error messages.
    pub fn parse_line(&self, text: &str, line: usize) -> Result<TraceRecord, TraceError> {
        let text = text.trim();

        // "unused file" contains "used file", so it has to be tried first.
        if let Some(caps) = self.unused.captures(text) {
            return Self::load_record(LoadKind::Unused, &caps, line);
        }
        if let Some(caps) = self.used.captures(text) {
            return Self::load_record(LoadKind::Used, &caps, line);
        }
        if let Some(caps) = self.parent.captures(text) {
            let sequence = Self::sequence(&caps[1], line)?;
            // An empty symbol token (double space) reads as a whole-module import
            let mut parts = caps[2].split(' ');
            let path = parts.next().unwrap_or_default().to_string();
            let symbol = parts
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            return Ok(TraceRecord::Parent {
                sequence,
                path,
                symbol,
            });
        }

        Ok(TraceRecord::Separator)
    }

    fn load_record(
        kind: LoadKind,
        caps: &regex::Captures<'_>,
        line: usize,
    ) -> Result<TraceRecord, TraceError> {
        let sequence = Self::sequence(&caps[1], line)?;
        let raw_cost = caps[3].trim();
        let cost_ms: f64 = raw_cost.parse().map_err(|_| TraceError::InvalidCost {
            line,
            value: raw_cost.to_string(),
        })?;
        if !cost_ms.is_finite() || cost_ms < 0.0 {
            return Err(TraceError::InvalidCost {
                line,
                value: raw_cost.to_string(),
            });
        }

        Ok(TraceRecord::Load {
            kind,
            sequence,
            path: caps[2].to_string(),
            cost_ms,
        })
    }

    fn sequence(raw: &str, line: usize) -> Result<u64, TraceError> {
        raw.parse().map_err(|_| TraceError::InvalidSequence {
            line,
            value: raw.to_string(),
        })
    }

    /// Parse a whole trace, enforcing the line-order state machine
    ///
    /// Returns `(line_number, record)` pairs in trace order.
    pub fn parse_str(&self, text: &str) -> Result<Vec<(usize, TraceRecord)>, TraceError> {
        let mut state = ParseState::Init;
        let mut records = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let record = self.parse_line(raw, line)?;
            state = state.advance(&record, line)?;
            records.push((line, record));
        }

        Ok(records)
    }

    /// Streaming variant of [`TraceParser::parse_str`]
    pub fn parse_reader<R: BufRead>(
        &self,
        reader: R,
    ) -> Result<Vec<(usize, TraceRecord)>, TraceError> {
        let mut state = ParseState::Init;
        let mut records = Vec::new();

        for (idx, raw) in reader.lines().enumerate() {
            let line = idx + 1;
            let raw = raw?;
            let record = self.parse_line(&raw, line)?;
            state = state.advance(&record, line)?;
            records.push((line, record));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_used_line() {
        let parser = TraceParser::new().unwrap();
        let record = parser
            .parse_line("used file 3: src/pages/Index.ets, cost time: 12.5ms", 1)
            .unwrap();
        assert_eq!(
            record,
            TraceRecord::Load {
                kind: LoadKind::Used,
                sequence: 3,
                path: "src/pages/Index.ets".to_string(),
                cost_ms: 12.5,
            }
        );
    }

    #[test]
    fn test_unused_is_not_mistaken_for_used() {
        let parser = TraceParser::new().unwrap();
        let record = parser
            .parse_line("  unused file 7: lib/util.js, cost time: 0.25ms  ", 1)
            .unwrap();
        match record {
            TraceRecord::Load { kind, path, .. } => {
                assert_eq!(kind, LoadKind::Unused);
                assert_eq!(path, "lib/util.js");
            }
            other => panic!("expected load record, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_parent_with_symbol() {
        let parser = TraceParser::new().unwrap();
        let record = parser
            .parse_line("parentModule 3: src/entry/Ability.ets initLogger", 1)
            .unwrap();
        assert_eq!(
            record,
            TraceRecord::Parent {
                sequence: 3,
                path: "src/entry/Ability.ets".to_string(),
                symbol: Some("initLogger".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_parent_double_space_is_whole_module() {
        let parser = TraceParser::new().unwrap();
        let record = parser
            .parse_line("parentModule 3: src/entry/Ability.ets  initLogger", 1)
            .unwrap();
        assert_eq!(
            record,
            TraceRecord::Parent {
                sequence: 3,
                path: "src/entry/Ability.ets".to_string(),
                symbol: None,
            }
        );
    }

    #[test]
    fn test_reader_io_error_keeps_source() {
        use std::error::Error as _;

        let parser = TraceParser::new().unwrap();
        let bytes: &[u8] = &[0xff, 0xfe, b'\n'];
        let err = parser.parse_reader(bytes).unwrap_err();
        assert!(matches!(err, TraceError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_parse_parent_whole_module() {
        let parser = TraceParser::new().unwrap();
        let record = parser
            .parse_line("parentModule 3: src/entry/Ability.ets", 1)
            .unwrap();
        assert!(matches!(
            record,
            TraceRecord::Parent { symbol: None, .. }
        ));
    }

    #[test]
    fn test_unmatched_line_is_separator() {
        let parser = TraceParser::new().unwrap();
        assert_eq!(
            parser.parse_line("---- import analysis ----", 1).unwrap(),
            TraceRecord::Separator
        );
        assert_eq!(parser.parse_line("", 2).unwrap(), TraceRecord::Separator);
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        let parser = TraceParser::new().unwrap();
        let err = parser
            .parse_line("used file 1: a.js, cost time: fastms", 9)
            .unwrap_err();
        assert!(matches!(
            err,
            TraceError::InvalidCost { line: 9, ref value } if value == "fast"
        ));
    }

    #[test]
    fn test_state_machine_rejects_orphan_parent() {
        let parser = TraceParser::new().unwrap();
        let trace = "header\nparentModule 1: a.js\n";
        let err = parser.parse_str(trace).unwrap_err();
        assert!(matches!(err, TraceError::ParentWithoutContext { line: 2 }));
    }

    #[test]
    fn test_separator_closes_context() {
        let parser = TraceParser::new().unwrap();
        let trace = "used file 1: b.js, cost time: 1ms\n\nparentModule 1: a.js\n";
        assert!(parser.parse_str(trace).is_err());
    }

    #[test]
    fn test_parse_str_keeps_line_numbers() {
        let parser = TraceParser::new().unwrap();
        let trace = "used file 1: b.js, cost time: 1ms\nparentModule 1: a.js\nparentModule 1: c.js x\n";
        let records = parser.parse_str(trace).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].0, 3);
    }

    #[test]
    fn test_parse_reader_matches_parse_str() {
        let parser = TraceParser::new().unwrap();
        let trace = "used file 1: b.js, cost time: 1ms\nparentModule 1: a.js\n";
        let from_reader = parser.parse_reader(trace.as_bytes()).unwrap();
        assert_eq!(from_reader, parser.parse_str(trace).unwrap());
    }

    #[test]
    fn test_state_transitions() {
        let load = TraceRecord::Load {
            kind: LoadKind::Unused,
            sequence: 0,
            path: "x".into(),
            cost_ms: 0.0,
        };
        let parent = TraceRecord::Parent {
            sequence: 0,
            path: "y".into(),
            symbol: None,
        };
        let state = ParseState::Init.advance(&load, 1).unwrap();
        assert_eq!(state, ParseState::OpenUnused);
        let state = state.advance(&parent, 2).unwrap();
        assert_eq!(state, ParseState::OpenParent);
        assert!(state.has_open_file());
        let state = state.advance(&TraceRecord::Separator, 3).unwrap();
        assert_eq!(state, ParseState::Init);
    }

    #[test]
    fn test_file_kind_display() {
        assert_eq!(FileKind::Used.to_string(), "Used");
        assert_eq!(FileKind::Unused.to_string(), "Unused");
        assert_eq!(FileKind::Placeholder.to_string(), "Temp");
    }
}
