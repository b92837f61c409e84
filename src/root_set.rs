//! Entry and test root-set lists
//!
//! A root-set file is a newline-delimited list of exact paths or path
//! substrings. Blank lines and lines starting with `//` or `#` are ignored.
//!
//! ```text
//! # application entries
//! src/main/ets/entryability/EntryAbility.ets
//! pages/Index
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parsed list of root patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSet {
    patterns: Vec<String>,
}

impl RootSet {
    pub fn parse(text: &str) -> Self {
        let patterns = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !line.starts_with("//") && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { patterns }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read root-set file: {}", path.as_ref().display())
        })?;
        Ok(Self::parse(&content))
    }

    /// Exact or substring match against any pattern
    pub fn matches(&self, id: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| id == pattern || id.contains(pattern.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_comments_and_blanks_ignored() {
        let set = RootSet::parse("# header\n\n// note\n  pages/Index  \nentry.ets\n");
        assert_eq!(set.patterns(), &["pages/Index", "entry.ets"]);
    }

    #[test]
    fn test_substring_match() {
        let set = RootSet::parse("pages/Index\n");
        assert!(set.matches("src/main/ets/pages/Index.ets"));
        assert!(!set.matches("src/main/ets/pages/Detail.ets"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = RootSet::parse("# only a comment\n");
        assert!(set.is_empty());
        assert!(!set.matches("anything"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a.js").unwrap();
        writeln!(file, "#b.js").unwrap();
        let set = RootSet::from_file(file.path()).unwrap();
        assert_eq!(set.patterns(), &["a.js"]);
    }

    #[test]
    fn test_from_file_missing() {
        let err = RootSet::from_file("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("Failed to read root-set file"));
    }
}
