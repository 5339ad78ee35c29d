//! Syntax-aware content preprocessing.
//!
//! License headers and import blocks carry no semantic signal while being
//! near-identical across unrelated files, which makes them a
//! false-similarity source in embeddings. Before a file is embedded, its
//! leading comment/import/include nodes are stripped using the grammar
//! registered for the file's extension; files with an unmapped extension
//! pass through unchanged.

mod registry;

pub use registry::LanguageRegistry;

use tree_sitter::{Language, Parser};

/// Top-level node kinds that never carry indexable payload.
const SKIPPABLE_KINDS: &[&str] = &[
    "comment",
    "line_comment",
    "block_comment",
    "preproc_include",
    "import_statement",
    "import_from_statement",
    "use_declaration",
    "extern_crate_declaration",
];

/// Strip leading non-semantic content from a source file.
///
/// Parses `content` with `grammar`, scans top-level nodes in document
/// order, and returns the trimmed substring starting at the first node
/// that is not a comment, import, include, or pure whitespace. Returns an
/// empty string when every top-level node is skippable: the file has no
/// indexable payload.
///
/// Parse setup failures fall back to returning the content unchanged.
#[must_use]
pub fn strip_header(content: &str, grammar: &Language) -> String {
    let mut parser = Parser::new();
    if parser.set_language(grammar).is_err() {
        tracing::debug!("Grammar rejected by parser, skipping header strip");
        return content.to_string();
    }

    let Some(tree) = parser.parse(content, None) else {
        tracing::debug!("Parse produced no tree, skipping header strip");
        return content.to_string();
    };

    let root = tree.root_node();
    let mut cursor = root.walk();
    for node in root.children(&mut cursor) {
        if SKIPPABLE_KINDS.contains(&node.kind()) {
            continue;
        }
        if content[node.byte_range()].trim().is_empty() {
            continue;
        }
        return content[node.start_byte()..].trim().to_string();
    }

    String::new()
}

/// Preprocess a file's content given its path: look up the grammar by
/// extension and strip the header, or pass the content through when no
/// grammar is mapped.
#[must_use]
pub fn preprocess(content: &str, path: &str, registry: &LanguageRegistry) -> String {
    registry
        .for_path(path)
        .map_or_else(|| content.to_string(), |g| strip_header(content, g))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn cpp() -> Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    #[test]
    fn test_strips_python_header() {
        let source = "\
# license header
# more header
import sys

import os
from pathlib import Path

print('x')
print('y')
";
        let stripped = strip_header(source, &python());
        assert_eq!(stripped, "print('x')\nprint('y')");
    }

    #[test]
    fn test_strips_cpp_includes_and_comments() {
        let source = "\
// Copyright notice
#include <vector>
#include \"local.hpp\"

int main() { return 0; }
";
        let stripped = strip_header(source, &cpp());
        assert_eq!(stripped, "int main() { return 0; }");
    }

    #[test]
    fn test_all_skippable_yields_empty() {
        let source = "# only a comment\nimport sys\n";
        assert_eq!(strip_header(source, &python()), "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strip_header("", &python()), "");
    }

    #[test]
    fn test_idempotent() {
        let source = "# header\nimport os\n\ndef f():\n    return 1\n";
        let once = strip_header(source, &python());
        let twice = strip_header(&once, &python());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_interior_comments_kept() {
        let source = "# header\ndef f():\n    return 1\n\n# interior comment\ndef g():\n    return 2\n";
        let stripped = strip_header(source, &python());
        assert!(stripped.starts_with("def f():"));
        assert!(stripped.contains("# interior comment"));
    }

    #[test]
    fn test_preprocess_unmapped_extension_passthrough() {
        let registry = LanguageRegistry::standard();
        let content = "# Test Project\nThis is a readme.\n";
        assert_eq!(preprocess(content, "README.md", &registry), content);
    }

    #[test]
    fn test_preprocess_mapped_extension_strips() {
        let registry = LanguageRegistry::standard();
        let content = "import sys\nprint('x')\n";
        assert_eq!(preprocess(content, "main.py", &registry), "print('x')");
    }
}
