//! Exclusion and string-alias name sets.
//!
//! Built once at startup and threaded through the pipeline as `&GeneratorConfig`.
use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;

/// Hand-authored core types; their definitions live outside the generated file.
pub const DEFAULT_EXCLUDED: &[&str] = &["LSPAny", "LSPObject", "LSPArray"];

/// Aliases decoded as bare strings wherever they are referenced.
pub const DEFAULT_STRING_ALIASES: &[&str] = &[
    "ChangeAnnotationIdentifier",
    "Pattern",
    "RegularExpressionEngineKind",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Sanitized entity names that are never emitted.
    pub excluded: BTreeSet<String>,
    /// Alias names treated as raw strings (no wrapper type, no nested decoder).
    pub string_aliases: BTreeSet<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            string_aliases: DEFAULT_STRING_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GeneratorConfig {
    /// Empty sets; nothing excluded, no string aliases.
    pub fn empty() -> Self {
        Self {
            excluded: BTreeSet::new(),
            string_aliases: BTreeSet::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        crate::path_de::load_json_file(path)
    }

    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_string_aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.string_aliases.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    pub fn is_string_alias(&self, name: &str) -> bool {
        self.string_aliases.contains(name)
    }
}
