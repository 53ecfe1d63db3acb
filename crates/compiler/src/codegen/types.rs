//! Enclosing Type Declarations
//!
//! Re-emits the `partial` wrapper declaration of every type between the
//! namespace and the producers, so the generated methods land inside the
//! same (possibly nested, possibly generic) type that declared them.

use super::{CodeGen, CodeGenError};
use evgen_core::TypeSymbol;

impl CodeGen<'_> {
    /// Open one enclosing type: its header line and opening brace
    pub(super) fn emit_type_header(&mut self, ty: &TypeSymbol) -> Result<(), CodeGenError> {
        self.line(&type_header(ty))?;
        self.open_scope()
    }
}

/// Declaration header of a `partial` wrapper for `ty`.
///
/// `abstract` and `static` are mutually exclusive; a sealed abstract type
/// is how `static` classes appear in metadata, so it never gets `abstract`.
pub fn type_header(ty: &TypeSymbol) -> String {
    let mut header = String::from(ty.accessibility.modifier());

    if ty.is_abstract && !ty.is_sealed {
        header.push_str("abstract ");
    } else if ty.is_static {
        header.push_str("static ");
    }

    header.push_str("partial ");
    header.push_str(ty.kind.keyword());
    header.push(' ');
    header.push_str(&ty.display_name());
    header
}
