//! evgen Core: the read-only declaration model
//!
//! This crate describes the declarations the event wiring generator reads:
//! types with their nesting, accessibility and modifiers, and methods with
//! their parameters and annotations. Parsing, constant folding and type
//! resolution happen elsewhere; by the time a declaration lands here every
//! annotation argument is either a folded constant or an opaque expression.
//!
//! # Modules
//!
//! - `symbols`: `TypeSymbol`, `MethodSymbol` and the `SymbolTable` trait
//! - `snapshot`: TOML/JSON manifest format implementing `SymbolTable`

pub mod snapshot;
pub mod symbols;

pub use snapshot::Snapshot;
pub use symbols::{
    Accessibility, Attribute, AttributeArgument, ConstantValue, MethodId, MethodSymbol,
    Parameter, PartialKind, RefKind, SymbolError, SymbolTable, TypeId, TypeKind, TypeSymbol,
    qualify,
};
