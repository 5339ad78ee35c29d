//! Extension-to-grammar mapping.

use std::collections::HashMap;

use tree_sitter::Language;

/// Maps file extensions to tree-sitter grammars.
///
/// An absent mapping means "no stripping": the file's content is indexed
/// as-is.
#[derive(Default)]
pub struct LanguageRegistry {
    grammars: HashMap<String, Language>,
}

impl LanguageRegistry {
    /// An empty registry; nothing gets stripped.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard registry: Python, C++, and Rust.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        let python: Language = tree_sitter_python::LANGUAGE.into();
        registry.insert("py", python);

        let cpp: Language = tree_sitter_cpp::LANGUAGE.into();
        for ext in ["cpp", "cc", "cxx", "hpp", "hh", "hxx"] {
            registry.insert(ext, cpp.clone());
        }

        let rust: Language = tree_sitter_rust::LANGUAGE.into();
        registry.insert("rs", rust);

        registry
    }

    /// Register a grammar for an extension (without the leading dot).
    pub fn insert(&mut self, extension: impl Into<String>, grammar: Language) {
        self.grammars.insert(extension.into(), grammar);
    }

    /// Look up the grammar for an extension.
    #[must_use]
    pub fn for_extension(&self, extension: &str) -> Option<&Language> {
        self.grammars.get(extension)
    }

    /// Look up the grammar for a path by its extension.
    #[must_use]
    pub fn for_path(&self, path: &str) -> Option<&Language> {
        let extension = std::path::Path::new(path).extension()?.to_str()?;
        self.for_extension(extension)
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut extensions: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        f.debug_struct("LanguageRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_mappings() {
        let registry = LanguageRegistry::standard();
        assert!(registry.for_extension("py").is_some());
        assert!(registry.for_extension("cpp").is_some());
        assert!(registry.for_extension("hpp").is_some());
        assert!(registry.for_extension("rs").is_some());
        assert!(registry.for_extension("md").is_none());
    }

    #[test]
    fn test_for_path() {
        let registry = LanguageRegistry::standard();
        assert!(registry.for_path("src/main.py").is_some());
        assert!(registry.for_path("README.md").is_none());
        assert!(registry.for_path("Makefile").is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = LanguageRegistry::empty();
        assert!(registry.for_path("main.py").is_none());
    }
}
