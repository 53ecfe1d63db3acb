//! Source Generation via Text
//!
//! Turns a [`SynthesisUnit`] into the source text that completes its
//! forward-declared dispatch methods.
//!
//! # Generation Strategy
//!
//! 1. Preamble: header comment, `#nullable enable`, file-scoped namespace
//! 2. One `partial` wrapper declaration per enclosing type, outermost
//!    first, each opening a new indentation level
//! 3. One completed method per producer, calling every bound consumer in
//!    binding order with the producer's parameters forwarded by name
//! 4. Closing braces, innermost first
//!
//! Output is a pure function of the unit and the configuration: the same
//! unit always yields byte-identical text.
//!
//! # Example Output
//!
//! ```text
//! // <auto-generated />
//! #nullable enable
//!
//! namespace Game.Events;
//!
//! public static partial class Hooks
//! {
//!     public static partial void RaiseLogin(global::Game.Mobile m, ref int count)
//!     {
//!         global::Game.Handlers.OnLogin(m, ref count);
//!     }
//! }
//! ```

// Submodules
mod error;
mod events;
mod types;

// Re-exports
pub use error::CodeGenError;
pub use events::{format_arguments, format_parameter, format_signature};
pub use types::type_header;

use crate::binder::SynthesisUnit;
use crate::config::GeneratorConfig;
use std::fmt::Write as _;

pub struct CodeGen<'a> {
    config: &'a GeneratorConfig,
    output: String,
    /// Current nesting depth (one level per open brace)
    depth: usize,
}

impl<'a> CodeGen<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        CodeGen {
            config,
            output: String::new(),
            depth: 0,
        }
    }

    /// Generate the complete source text for one unit
    pub fn codegen_unit(mut self, unit: &SynthesisUnit) -> Result<String, CodeGenError> {
        self.emit_preamble(unit)?;

        for ty in &unit.chain {
            self.emit_type_header(ty)?;
        }

        for (index, bound) in unit.events.iter().enumerate() {
            if index > 0 {
                writeln!(&mut self.output)?;
            }
            self.emit_event(bound)?;
        }

        while self.depth > 0 {
            self.close_scope()?;
        }

        Ok(self.output)
    }

    fn emit_preamble(&mut self, unit: &SynthesisUnit) -> Result<(), CodeGenError> {
        let mut wrote_any = false;
        if !self.config.header.is_empty() {
            writeln!(&mut self.output, "{}", self.config.header)?;
            wrote_any = true;
        }
        if self.config.nullable {
            writeln!(&mut self.output, "#nullable enable")?;
            wrote_any = true;
        }
        if wrote_any {
            writeln!(&mut self.output)?;
        }

        if let Some(ns) = unit.namespace.as_deref()
            && !ns.is_empty()
        {
            writeln!(&mut self.output, "namespace {};", ns)?;
            writeln!(&mut self.output)?;
        }
        Ok(())
    }

    /// Write one indented line at the current depth
    fn line(&mut self, text: &str) -> Result<(), CodeGenError> {
        let width = self.depth * self.config.indent;
        writeln!(&mut self.output, "{:width$}{}", "", text, width = width)?;
        Ok(())
    }

    fn open_scope(&mut self) -> Result<(), CodeGenError> {
        self.line("{")?;
        self.depth += 1;
        Ok(())
    }

    fn close_scope(&mut self) -> Result<(), CodeGenError> {
        self.depth -= 1;
        self.line("}")
    }
}

/// Synthesize the source text for one unit
pub fn synthesize(unit: &SynthesisUnit, config: &GeneratorConfig) -> Result<String, CodeGenError> {
    CodeGen::new(config).codegen_unit(unit)
}
