//! Declaration Extractor
//!
//! Scans a symbol table for the two declaration shapes the generator cares
//! about:
//!
//! - **Consumers**: `static void` methods carrying one or more
//!   `[OnEvent("Name")]` annotations. Each annotation binds the method to
//!   one event name.
//! - **Producers**: `partial void` forward declarations carrying a
//!   `[GeneratedEvent("Name")]` annotation. The generator completes them.
//!
//! Extraction never fails on user input. An annotation whose argument is
//! not a string constant drops only its own binding; a declaration left
//! with no binding is simply not a consumer (or producer).
//!
//! # Known Limitations
//!
//! - A producer with several `GeneratedEvent` annotations is bound to the
//!   first one that resolves; the rest are ignored here and only surfaced
//!   by the `ambiguous-event-name` check in [`crate::validate`].

use crate::codegen::CodeGenError;
use evgen_core::{Attribute, MethodSymbol, SymbolTable, TypeId, TypeSymbol, qualify};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Annotation marking an event handler
pub const ON_EVENT_ATTRIBUTE: &str = "OnEvent";

/// Annotation marking a dispatch method to be generated
pub const GENERATED_EVENT_ATTRIBUTE: &str = "GeneratedEvent";

/// A handler method bound to one or more event names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsumerDecl {
    pub method: MethodSymbol,
    /// Qualified name of the declaring type, used as the call target
    pub owner: String,
    /// Bound names in annotation order, without repeats
    pub event_names: Vec<String>,
}

/// A forward-declared dispatch method awaiting its body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProducerDecl {
    pub method: MethodSymbol,
    pub event_name: String,
    /// Enclosing types, outermost first; the last one declares the method
    pub chain: Vec<TypeSymbol>,
}

impl ProducerDecl {
    /// The type that immediately declares the producer
    pub fn containing_type(&self) -> TypeId {
        self.method.containing_type
    }

    /// Namespace of the outermost enclosing type
    pub fn namespace(&self) -> Option<&str> {
        self.chain.first().and_then(|ty| ty.namespace.as_deref())
    }

    /// Fully qualified name of the declaring type
    pub fn qualified_type_name(&self) -> String {
        let chain: Vec<&TypeSymbol> = self.chain.iter().collect();
        qualify(&chain)
    }
}

/// Everything extracted from one symbol table snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Declarations {
    /// Consumers in source order
    pub consumers: Vec<ConsumerDecl>,
    /// Producers in source order
    pub producers: Vec<ProducerDecl>,
}

/// Extract consumers and producers from a symbol table.
///
/// Methods are examined in parallel; results keep source order, which
/// later fixes the order handlers are invoked in.
pub fn extract(table: &dyn SymbolTable) -> Result<Declarations, CodeGenError> {
    let methods = table.methods();

    let consumers = methods
        .par_iter()
        .filter_map(|method| consumer_from(table, method).transpose())
        .collect::<Result<Vec<_>, _>>()?;

    let producers = methods
        .par_iter()
        .filter_map(|method| producer_from(table, method).transpose())
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        methods = methods.len(),
        consumers = consumers.len(),
        producers = producers.len(),
        "extracted declarations"
    );

    Ok(Declarations {
        consumers,
        producers,
    })
}

fn consumer_from(
    table: &dyn SymbolTable,
    method: &MethodSymbol,
) -> Result<Option<ConsumerDecl>, CodeGenError> {
    if !method.is_static || !method.returns_void() {
        return Ok(None);
    }

    let mut event_names: Vec<String> = Vec::new();
    for attr in method.attributes_named(ON_EVENT_ATTRIBUTE) {
        let Some(name) = bound_name(attr) else {
            trace!(method = %method.name, "dropping OnEvent binding without a string constant");
            continue;
        };
        if !event_names.iter().any(|existing| existing == name) {
            event_names.push(name.to_string());
        }
    }

    if event_names.is_empty() {
        return Ok(None);
    }

    let owner = table.qualified_name(method.containing_type)?;
    Ok(Some(ConsumerDecl {
        method: method.clone(),
        owner,
        event_names,
    }))
}

fn producer_from(
    table: &dyn SymbolTable,
    method: &MethodSymbol,
) -> Result<Option<ProducerDecl>, CodeGenError> {
    if !method.is_forward_declaration() || !method.returns_void() {
        return Ok(None);
    }

    let Some(event_name) = method
        .attributes_named(GENERATED_EVENT_ATTRIBUTE)
        .find_map(bound_name)
    else {
        trace!(method = %method.name, "partial method has no resolvable GeneratedEvent name");
        return Ok(None);
    };

    let chain = table
        .containing_chain(method.containing_type)?
        .into_iter()
        .cloned()
        .collect();

    Ok(Some(ProducerDecl {
        method: method.clone(),
        event_name: event_name.to_string(),
        chain,
    }))
}

/// The event name an annotation binds, if its single argument is a string constant
pub(crate) fn bound_name(attr: &Attribute) -> Option<&str> {
    attr.single_argument()?.as_str()
}
