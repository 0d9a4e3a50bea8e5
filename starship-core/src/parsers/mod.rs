//! Pluggable parser capability
//!
//! A [`SourceParser`] turns one file's text into the normalized
//! [`SymbolTable`]; the [`ParserRegistry`] picks the parser by extension.
//! Files with no registered parser are not inventoried.

pub mod python;

pub use python::PythonParser;

use crate::models::SymbolTable;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Languages with a registered parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    Python,
}

impl std::fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
        }
    }
}

impl SourceLanguage {
    /// Whether `module` (first dotted segment) ships with the language runtime
    pub fn is_standard_module(self, module: &str) -> bool {
        match self {
            Self::Python => python::is_standard_module(module),
        }
    }
}

/// Language parser producing the normalized symbol table
pub trait SourceParser: Send + Sync {
    fn language(&self) -> SourceLanguage;

    /// File extensions handled, without the leading dot
    fn extensions(&self) -> &'static [&'static str];

    /// Parse one file. Syntax errors yield [`crate::Error::Parse`].
    fn parse(&self, path: &Path, source: &str) -> Result<SymbolTable>;
}

/// Extension-keyed parser lookup
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn SourceParser>>,
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.parsers.iter().map(|parser| parser.language()))
            .finish()
    }
}

impl ParserRegistry {
    /// Registry with every built-in parser
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(PythonParser::new()));
        registry
    }

    /// Later registrations win for shared extensions
    pub fn register(&mut self, parser: Arc<dyn SourceParser>) {
        self.parsers.insert(0, parser);
    }

    pub fn parser_for(&self, path: &Path) -> Option<Arc<dyn SourceParser>> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        self.parsers
            .iter()
            .find(|parser| parser.extensions().contains(&extension.as_str()))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
