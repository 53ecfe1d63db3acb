//! evgen Compiler Library
//!
//! Wires generated event dispatch methods to their handlers. Given the
//! declarations of a compilation unit, it completes every
//! `[GeneratedEvent("Name")] partial void` forward declaration with a body
//! that calls each `[OnEvent("Name")] static void` handler in turn.
//!
//! The pipeline runs in three stages, each a pure function of its input:
//!
//! 1. [`extract`]: find consumers and producers in a [`SymbolTable`]
//! 2. [`bind`]: join them by event name and group producers by declaring type
//! 3. [`synthesize`]: emit the source text of each group
//!
//! # Example
//!
//! ```rust,ignore
//! use evgen::{GeneratorConfig, generate};
//! use evgen_core::Snapshot;
//!
//! let snapshot = Snapshot::load(Path::new("unit.toml"))?;
//! let sources = generate(&snapshot, &GeneratorConfig::default())?;
//! for (key, text) in sources.iter() {
//!     println!("// {}\n{}", sources.hint_name(key), text);
//! }
//! ```

pub mod binder;
pub mod codegen;
pub mod config;
pub mod extract;
pub mod validate;

pub use binder::{BindingGroup, BoundProducer, SynthesisUnit, bind};
pub use codegen::{CodeGen, CodeGenError, synthesize};
pub use config::GeneratorConfig;
pub use extract::{
    ConsumerDecl, Declarations, GENERATED_EVENT_ATTRIBUTE, ON_EVENT_ATTRIBUTE, ProducerDecl,
    extract,
};
pub use validate::{Diagnostic, Severity, validate};

use evgen_core::{Snapshot, SymbolTable};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Generated source text, one entry per output key, in key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSources {
    sources: BTreeMap<String, String>,
    file_suffix: String,
}

impl GeneratedSources {
    /// `(key, text)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sources.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// File name an output key is written to
    pub fn hint_name(&self, key: &str) -> String {
        config::hint_name(key, &self.file_suffix)
    }
}

/// Run the whole pipeline over a symbol table
pub fn generate(
    table: &dyn SymbolTable,
    config: &GeneratorConfig,
) -> Result<GeneratedSources, CodeGenError> {
    let declarations = extract(table)?;
    let units = bind(&declarations)?;
    generate_units(&units, config)
}

/// Synthesize already-bound units.
///
/// Units are independent and synthesized in parallel; the results are
/// merged by key, and a key produced twice is an error rather than an
/// overwrite.
pub fn generate_units(
    units: &[SynthesisUnit],
    config: &GeneratorConfig,
) -> Result<GeneratedSources, CodeGenError> {
    let texts = units
        .par_iter()
        .map(|unit| -> Result<(String, String), CodeGenError> {
            Ok((unit.key.clone(), synthesize(unit, config)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut sources = BTreeMap::new();
    for (key, text) in texts {
        if sources.contains_key(&key) {
            return Err(CodeGenError::DuplicateOutput(key));
        }
        sources.insert(key, text);
    }

    Ok(GeneratedSources {
        sources,
        file_suffix: config.file_suffix.clone(),
    })
}

/// Load a snapshot, generate its sources and write one file per unit into `out_dir`
///
/// Returns the paths written, in key order.
pub fn generate_file(
    snapshot_path: &Path,
    out_dir: &Path,
    config: &GeneratorConfig,
) -> Result<Vec<PathBuf>, String> {
    let snapshot = Snapshot::load(snapshot_path)?;
    let sources = generate(&snapshot, config).map_err(|e| e.to_string())?;

    fs::create_dir_all(out_dir)
        .map_err(|e| format!("Failed to create {}: {}", out_dir.display(), e))?;

    let mut written = Vec::with_capacity(sources.len());
    for (key, text) in sources.iter() {
        let path = out_dir.join(sources.hint_name(key));
        fs::write(&path, text)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        info!(path = %path.display(), "wrote generated source");
        written.push(path);
    }
    Ok(written)
}

/// Load a snapshot and run the shape validation pass over it
pub fn check_file(snapshot_path: &Path) -> Result<Vec<Diagnostic>, String> {
    let snapshot = Snapshot::load(snapshot_path)?;
    let declarations = extract(&snapshot).map_err(|e| e.to_string())?;
    let units = bind(&declarations).map_err(|e| e.to_string())?;
    Ok(validate(&units))
}
