//! Generator configuration
//!
//! Controls the presentation of generated sources. The recognized
//! annotation names are fixed (see [`crate::extract`]) and deliberately
//! not part of this configuration.
//!
//! # Example
//!
//! ```toml
//! header = "// <auto-generated by evgen />"
//! nullable = false
//! indent = 2
//! file_suffix = ".Events.g.cs"
//! global_qualifier = true
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default leading comment of every generated file
pub const DEFAULT_HEADER: &str = "// <auto-generated />";

/// Default suffix appended to an output key to form its file name
pub const DEFAULT_FILE_SUFFIX: &str = ".GeneratedEvents.g.cs";

/// Configuration for source generation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Leading comment line; empty to omit
    pub header: String,

    /// Emit `#nullable enable` after the header
    pub nullable: bool,

    /// Spaces per nesting level
    pub indent: usize,

    /// Suffix that turns an output key into a file name
    pub file_suffix: String,

    /// Prefix consumer call targets with `global::`
    pub global_qualifier: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            header: DEFAULT_HEADER.to_string(),
            nullable: true,
            indent: 4,
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            global_qualifier: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        GeneratorConfig::default()
    }

    /// Parse configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse generator config: {}", e))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    /// Set the leading comment line (builder pattern)
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn with_global_qualifier(mut self, global_qualifier: bool) -> Self {
        self.global_qualifier = global_qualifier;
        self
    }

    /// File name for an output key
    pub fn hint_name(&self, key: &str) -> String {
        hint_name(key, &self.file_suffix)
    }
}

/// File name for an output key with the given suffix.
///
/// Type parameter brackets are not valid in every file system, so
/// `Cache<K, V>` becomes `Cache{K,V}`.
pub fn hint_name(key: &str, suffix: &str) -> String {
    let mut name = String::with_capacity(key.len() + suffix.len());
    for c in key.chars() {
        match c {
            '<' => name.push('{'),
            '>' => name.push('}'),
            ' ' => {}
            _ => name.push(c),
        }
    }
    name.push_str(suffix);
    name
}
