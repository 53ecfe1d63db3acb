//! Code generation error types.

use evgen_core::SymbolError;

/// Error type for the extract → bind → synthesize pipeline.
///
/// Only internal-consistency failures end up here. Unresolvable bindings
/// and unmatched names are silent outcomes, not errors.
#[derive(Debug)]
pub enum CodeGenError {
    /// The symbol table broke one of its own invariants
    Symbol(SymbolError),
    /// The same forward declaration was scheduled for completion twice
    DuplicateCompletion(String),
    /// Two distinct containing types resolved to the same output key
    DuplicateOutput(String),
    /// A formatting error when writing source text
    Format(std::fmt::Error),
}

impl std::fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeGenError::Symbol(e) => write!(f, "inconsistent symbol table: {}", e),
            CodeGenError::DuplicateCompletion(s) => {
                write!(f, "'{}' would be completed more than once", s)
            }
            CodeGenError::DuplicateOutput(s) => {
                write!(f, "two distinct types generate the same output '{}'", s)
            }
            CodeGenError::Format(e) => write!(f, "source generation error: {}", e),
        }
    }
}

impl std::error::Error for CodeGenError {}

impl From<SymbolError> for CodeGenError {
    fn from(e: SymbolError) -> Self {
        CodeGenError::Symbol(e)
    }
}

impl From<std::fmt::Error> for CodeGenError {
    fn from(e: std::fmt::Error) -> Self {
        CodeGenError::Format(e)
    }
}
