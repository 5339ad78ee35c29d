//! Ignore-rule filtering.
//!
//! The per-repository `.codebaseignore` file is a flat list of
//! shell-glob patterns (`*`, `?`, `[...]`), one per line, with `#`
//! comment lines and blank lines ignored. Patterns match the literal
//! repository-relative path string; any match excludes the path. There
//! is no negation and no ordering between rules.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

/// A compiled set of ignore rules.
#[derive(Debug)]
pub struct IgnoreRules {
    set: GlobSet,
    len: usize,
}

impl IgnoreRules {
    /// A rule set that matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            len: 0,
        }
    }

    /// Parse rules from ignore-file content.
    ///
    /// Lines are trimmed; empty lines and `#` comments are dropped.
    /// Malformed patterns are skipped with a warning, never raised.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut len = 0;

        for line in content.lines() {
            let pattern = line.trim();
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    len += 1;
                }
                Err(e) => {
                    tracing::warn!(pattern, error = %e, "Skipping malformed ignore pattern");
                }
            }
        }

        match builder.build() {
            Ok(set) => Self { set, len },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to compile ignore rules, filtering disabled");
                Self::empty()
            }
        }
    }

    /// Load rules from the ignore file at `path`. A missing file yields
    /// an empty rule set.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let rules = Self::parse(&content);
                tracing::debug!(path = %path.display(), rules = rules.len(), "Loaded ignore rules");
                rules
            }
            Err(_) => Self::empty(),
        }
    }

    /// Number of compiled rules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the rule set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any rule matches the path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// Remove matching paths, preserving input order.
    #[must_use]
    pub fn filter(&self, paths: Vec<String>) -> Vec<String> {
        if self.is_empty() {
            return paths;
        }
        paths.into_iter().filter(|p| !self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let rules = IgnoreRules::parse("*.py\n\n# a comment\n  \n*.log\n");
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_star_matches_across_directories() {
        let rules = IgnoreRules::parse("*.py\n");
        assert!(rules.matches("main.py"));
        assert!(rules.matches("src/deep/module.py"));
        assert!(!rules.matches("README.md"));
    }

    #[test]
    fn test_question_mark_and_class() {
        let rules = IgnoreRules::parse("file?.txt\ndata[0-9].csv\n");
        assert!(rules.matches("file1.txt"));
        assert!(!rules.matches("file10.txt"));
        assert!(rules.matches("data7.csv"));
        assert!(!rules.matches("datax.csv"));
    }

    #[test]
    fn test_filter_is_subset_preserving_order() {
        let rules = IgnoreRules::parse("*.py\n");
        let input = paths(&["b.py", "README.md", "a.py", "notes.txt"]);
        let out = rules.filter(input);
        assert_eq!(out, paths(&["README.md", "notes.txt"]));
    }

    #[test]
    fn test_unmatched_path_always_survives() {
        let rules = IgnoreRules::parse("*.py\n*.log\n");
        let out = rules.filter(paths(&["README.md"]));
        assert_eq!(out, paths(&["README.md"]));
    }

    #[test]
    fn test_empty_rules_filter_nothing() {
        let rules = IgnoreRules::empty();
        let input = paths(&["a.py", "b.md"]);
        assert_eq!(rules.filter(input.clone()), input);
    }

    #[test]
    fn test_malformed_pattern_skipped() {
        // Unclosed character class; must not raise.
        let rules = IgnoreRules::parse("[oops\n*.py\n");
        assert!(rules.matches("main.py"));
    }

    #[test]
    fn test_load_missing_file_yields_empty() {
        let tmp = TempDir::new().unwrap();
        let rules = IgnoreRules::load(&tmp.path().join(".codebaseignore"));
        assert!(rules.is_empty());
    }

    #[test]
    fn test_load_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".codebaseignore");
        std::fs::write(&path, "*.py\n# Ignore all Python files\n").unwrap();

        let rules = IgnoreRules::load(&path);
        assert_eq!(rules.len(), 1);
        assert!(rules.matches("utils.py"));
    }
}
