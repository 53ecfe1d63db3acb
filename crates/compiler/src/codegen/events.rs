//! Dispatch Method Bodies
//!
//! Completes each forward-declared producer with a body that calls every
//! bound consumer, forwarding the producer's parameters by name with the
//! same passing mode (`ref`, `out`, `in`) the producer declares.
//!
//! Parameter compatibility between a producer and its consumers is not
//! checked here; see [`crate::validate`].

use super::{CodeGen, CodeGenError};
use crate::binder::BoundProducer;
use crate::extract::ConsumerDecl;
use evgen_core::{MethodSymbol, Parameter, RefKind};

impl CodeGen<'_> {
    /// Emit one completed producer
    pub(super) fn emit_event(&mut self, bound: &BoundProducer) -> Result<(), CodeGenError> {
        let method = &bound.producer.method;
        self.line(&format_signature(method))?;
        self.open_scope()?;

        let arguments = format_arguments(&method.parameters);
        for consumer in &bound.consumers {
            let call = format!(
                "{}.{}({});",
                self.call_target(consumer),
                consumer.method.name,
                arguments
            );
            self.line(&call)?;
        }

        self.close_scope()
    }

    fn call_target(&self, consumer: &ConsumerDecl) -> String {
        if self.config.global_qualifier {
            format!("global::{}", consumer.owner)
        } else {
            consumer.owner.clone()
        }
    }
}

/// Signature of the completing half of a producer
/// (`public static partial void RaiseLogin(Mobile m)`)
pub fn format_signature(method: &MethodSymbol) -> String {
    let mut signature = String::from(method.accessibility.modifier());
    if method.is_static {
        signature.push_str("static ");
    }
    signature.push_str("partial ");
    signature.push_str(method.return_type.trim());
    signature.push(' ');
    signature.push_str(&method.name);

    if !method.type_parameters.is_empty() {
        signature.push('<');
        signature.push_str(&method.type_parameters.join(", "));
        signature.push('>');
    }

    let parameters: Vec<String> = method.parameters.iter().map(format_parameter).collect();
    signature.push('(');
    signature.push_str(&parameters.join(", "));
    signature.push(')');
    signature
}

/// One declared parameter: `[mode ]type name[ = default]`
pub fn format_parameter(parameter: &Parameter) -> String {
    let mut text = String::new();
    if parameter.ref_kind != RefKind::None {
        text.push_str(parameter.ref_kind.keyword());
        text.push(' ');
    }
    text.push_str(&parameter.ty);
    text.push(' ');
    text.push_str(&parameter.name);
    if let Some(default) = &parameter.default_value {
        text.push_str(" = ");
        text.push_str(default);
    }
    text
}

/// Call-site argument list forwarding `parameters` by name
pub fn format_arguments(parameters: &[Parameter]) -> String {
    let arguments: Vec<String> = parameters
        .iter()
        .map(|parameter| match parameter.ref_kind {
            RefKind::None => parameter.name.clone(),
            kind => format!("{} {}", kind.keyword(), parameter.name),
        })
        .collect();
    arguments.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use evgen_core::{Accessibility, MethodId, PartialKind, TypeId};

    fn param(name: &str, ty: &str, ref_kind: RefKind) -> Parameter {
        Parameter {
            name: name.to_string(),
            ty: ty.to_string(),
            ref_kind,
            default_value: None,
        }
    }

    fn make_method(name: &str, parameters: Vec<Parameter>) -> MethodSymbol {
        MethodSymbol {
            id: MethodId(0),
            name: name.to_string(),
            containing_type: TypeId(0),
            accessibility: Accessibility::NotApplicable,
            is_static: false,
            partial: PartialKind::Definition,
            return_type: "void".to_string(),
            type_parameters: vec![],
            parameters,
            attributes: vec![],
        }
    }

    #[test]
    fn test_arguments_forward_passing_modes() {
        let parameters = vec![
            param("a", "int", RefKind::None),
            param("b", "int", RefKind::Ref),
            param("c", "int", RefKind::Out),
            param("d", "Point", RefKind::In),
        ];
        assert_eq!(format_arguments(&parameters), "a, ref b, out c, in d");
        assert_eq!(format_arguments(&[]), "");
    }

    #[test]
    fn test_parameter_with_default() {
        let mut p = param("reason", "string?", RefKind::None);
        p.default_value = Some("null".to_string());
        assert_eq!(format_parameter(&p), "string? reason = null");

        let p = param("total", "long", RefKind::Out);
        assert_eq!(format_parameter(&p), "out long total");
    }

    #[test]
    fn test_signature_modifiers() {
        let mut method = make_method("Raise", vec![param("m", "Mobile", RefKind::None)]);
        assert_eq!(format_signature(&method), "partial void Raise(Mobile m)");

        method.accessibility = Accessibility::ProtectedOrInternal;
        method.is_static = true;
        method.type_parameters = vec!["T".to_string()];
        assert_eq!(
            format_signature(&method),
            "protected internal static partial void Raise<T>(Mobile m)"
        );
    }
}
