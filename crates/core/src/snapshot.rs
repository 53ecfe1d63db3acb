//! Snapshot manifests
//!
//! A snapshot is the declaration set of one compilation unit, written out
//! by the host as TOML (or JSON) and loaded here into a [`Snapshot`] that
//! implements [`SymbolTable`].
//!
//! # Example
//!
//! ```toml
//! [[type]]
//! key = "hooks"
//! name = "Hooks"
//! namespace = "Game.Events"
//! accessibility = "public"
//! static = true
//!
//! [[method]]
//! name = "RaiseLogin"
//! containing_type = "hooks"
//! accessibility = "public"
//! static = true
//! partial = "definition"
//!
//! [[method.parameter]]
//! name = "m"
//! type = "global::Game.Mobile"
//!
//! [[method.attribute]]
//! name = "GeneratedEvent"
//! arguments = [{ string = "Login" }]
//! ```
//!
//! Types are referenced by their manifest `key` (defaulting to `name`),
//! which is resolved into a [`TypeId`] at load time.

use crate::symbols::{
    Accessibility, Attribute, MethodId, MethodSymbol, Parameter, PartialKind, SymbolTable,
    TypeId, TypeKind, TypeSymbol,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct TypeEntry {
    /// Manifest-local identity; defaults to `name`
    key: Option<String>,
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    containing_type: Option<String>,
    #[serde(default)]
    kind: TypeKind,
    #[serde(default)]
    accessibility: Accessibility,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default, rename = "sealed")]
    is_sealed: bool,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default)]
    type_parameters: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MethodEntry {
    name: String,
    containing_type: Option<String>,
    #[serde(default)]
    accessibility: Accessibility,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default)]
    partial: PartialKind,
    #[serde(default = "default_return_type", rename = "returns")]
    return_type: String,
    #[serde(default)]
    type_parameters: Vec<String>,
    #[serde(default, rename = "parameter")]
    parameters: Vec<Parameter>,
    #[serde(default, rename = "attribute")]
    attributes: Vec<Attribute>,
}

fn default_return_type() -> String {
    "void".to_string()
}

/// Top-level manifest structure
#[derive(Debug, Clone, Deserialize)]
struct Manifest {
    #[serde(default, rename = "type")]
    types: Vec<TypeEntry>,
    #[serde(default, rename = "method")]
    methods: Vec<MethodEntry>,
}

/// Declarations of one compilation unit, loaded from a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    types: Vec<TypeSymbol>,
    methods: Vec<MethodSymbol>,
}

impl Snapshot {
    /// Parse a snapshot from TOML content
    pub fn from_toml(content: &str) -> Result<Self, String> {
        let manifest: Manifest =
            toml::from_str(content).map_err(|e| format!("Failed to parse snapshot: {}", e))?;
        Self::from_manifest(manifest)
    }

    /// Parse a snapshot from JSON content
    pub fn from_json(content: &str) -> Result<Self, String> {
        let manifest: Manifest = serde_json::from_str(content)
            .map_err(|e| format!("Failed to parse snapshot: {}", e))?;
        Self::from_manifest(manifest)
    }

    /// Load a snapshot file; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read snapshot {}: {}", path.display(), e))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let snapshot = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        };
        snapshot.map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// All type declarations, in manifest order
    pub fn types(&self) -> &[TypeSymbol] {
        &self.types
    }

    fn from_manifest(manifest: Manifest) -> Result<Self, String> {
        let mut keys: HashMap<String, TypeId> = HashMap::new();
        for (index, entry) in manifest.types.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(format!("Type {} has empty name", index + 1));
            }
            let key = entry.key.clone().unwrap_or_else(|| entry.name.clone());
            let id = TypeId(index_to_u32(index)?);
            if keys.insert(key.clone(), id).is_some() {
                return Err(format!("Duplicate type key '{}'", key));
            }
        }

        let lookup = |key: &str, owner: &str| -> Result<TypeId, String> {
            keys.get(key)
                .copied()
                .ok_or_else(|| format!("'{}' references unknown containing type '{}'", owner, key))
        };

        let mut types = Vec::with_capacity(manifest.types.len());
        for (index, entry) in manifest.types.into_iter().enumerate() {
            let containing_type = match entry.containing_type.as_deref() {
                Some(key) => Some(lookup(key, &entry.name)?),
                None => None,
            };
            types.push(TypeSymbol {
                id: TypeId(index_to_u32(index)?),
                name: entry.name,
                namespace: entry.namespace.filter(|ns| !ns.trim().is_empty()),
                containing_type,
                kind: entry.kind,
                accessibility: entry.accessibility,
                is_abstract: entry.is_abstract,
                is_sealed: entry.is_sealed,
                is_static: entry.is_static,
                type_parameters: entry.type_parameters,
            });
        }

        let mut methods = Vec::with_capacity(manifest.methods.len());
        for (index, entry) in manifest.methods.into_iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(format!("Method {} has empty name", index + 1));
            }
            let key = entry
                .containing_type
                .as_deref()
                .ok_or_else(|| format!("Method '{}' has no containing type", entry.name))?;
            let containing_type = lookup(key, &entry.name)?;
            methods.push(MethodSymbol {
                id: MethodId(index_to_u32(index)?),
                name: entry.name,
                containing_type,
                accessibility: entry.accessibility,
                is_static: entry.is_static,
                partial: entry.partial,
                return_type: entry.return_type,
                type_parameters: entry.type_parameters,
                parameters: entry.parameters,
                attributes: entry.attributes,
            });
        }

        let snapshot = Snapshot { types, methods };
        for ty in &snapshot.types {
            snapshot
                .containing_chain(ty.id)
                .map_err(|e| format!("Type '{}': {}", ty.name, e))?;
        }
        Ok(snapshot)
    }
}

fn index_to_u32(index: usize) -> Result<u32, String> {
    u32::try_from(index).map_err(|_| "Snapshot has too many declarations".to_string())
}

impl SymbolTable for Snapshot {
    fn methods(&self) -> &[MethodSymbol] {
        &self.methods
    }

    fn type_symbol(&self, id: TypeId) -> Option<&TypeSymbol> {
        self.types.get(id.0 as usize)
    }
}
