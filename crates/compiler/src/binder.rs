//! Binder
//!
//! Joins producers to consumers by event name and groups producers by the
//! type that declares them. Each group becomes one [`SynthesisUnit`],
//! which maps to exactly one generated artifact.
//!
//! Grouping is by type identity ([`TypeId`]), never by display name.

use crate::codegen::CodeGenError;
use crate::extract::{ConsumerDecl, Declarations, ProducerDecl};
use evgen_core::{MethodId, TypeId, TypeSymbol};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Event name → consumers bound to it, in discovery order
///
/// Names without consumers are absent rather than mapped to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BindingGroup {
    bindings: BTreeMap<String, Vec<ConsumerDecl>>,
}

impl BindingGroup {
    /// Group consumers by every name they bind
    pub fn build(consumers: &[ConsumerDecl]) -> Self {
        let mut bindings: BTreeMap<String, Vec<ConsumerDecl>> = BTreeMap::new();
        for consumer in consumers {
            for name in &consumer.event_names {
                bindings
                    .entry(name.clone())
                    .or_default()
                    .push(consumer.clone());
            }
        }
        BindingGroup { bindings }
    }

    /// Consumers bound to `name`; empty when nothing binds it
    pub fn consumers(&self, name: &str) -> &[ConsumerDecl] {
        self.bindings.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bound names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A producer together with the consumers its body will call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundProducer {
    pub producer: ProducerDecl,
    pub consumers: Vec<ConsumerDecl>,
}

/// All producer completions emitted together for one declaring type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SynthesisUnit {
    /// Output key: fully qualified name of the declaring type
    pub key: String,
    pub containing_type: TypeId,
    /// Namespace of the outermost type
    pub namespace: Option<String>,
    /// Enclosing types, outermost first
    pub chain: Vec<TypeSymbol>,
    /// Producers in discovery order
    pub events: Vec<BoundProducer>,
}

impl SynthesisUnit {
    fn open(producer: &ProducerDecl) -> Self {
        SynthesisUnit {
            key: producer.qualified_type_name(),
            containing_type: producer.containing_type(),
            namespace: producer.namespace().map(str::to_string),
            chain: producer.chain.clone(),
            events: Vec::new(),
        }
    }
}

/// Bind extracted declarations into synthesis units.
///
/// Units come out in the order their declaring type first appears among
/// the producers. Fails if a producer would be completed twice or if two
/// distinct types would write the same output.
pub fn bind(declarations: &Declarations) -> Result<Vec<SynthesisUnit>, CodeGenError> {
    let group = BindingGroup::build(&declarations.consumers);

    let mut completed: HashSet<MethodId> = HashSet::new();
    let mut unit_index: HashMap<TypeId, usize> = HashMap::new();
    let mut units: Vec<SynthesisUnit> = Vec::new();

    for producer in &declarations.producers {
        if !completed.insert(producer.method.id) {
            return Err(CodeGenError::DuplicateCompletion(format!(
                "{}.{}",
                producer.qualified_type_name(),
                producer.method.name
            )));
        }

        let index = *unit_index
            .entry(producer.containing_type())
            .or_insert_with(|| {
                units.push(SynthesisUnit::open(producer));
                units.len() - 1
            });

        units[index].events.push(BoundProducer {
            producer: producer.clone(),
            consumers: group.consumers(&producer.event_name).to_vec(),
        });
    }

    let mut keys: HashSet<&str> = HashSet::new();
    for unit in &units {
        if !keys.insert(unit.key.as_str()) {
            return Err(CodeGenError::DuplicateOutput(unit.key.clone()));
        }
    }

    debug!(
        names = group.len(),
        units = units.len(),
        "bound producers to consumers"
    );
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use evgen_core::Snapshot;

    fn bind_from(toml: &str) -> Result<Vec<SynthesisUnit>, CodeGenError> {
        let snapshot = Snapshot::from_toml(toml).unwrap();
        bind(&extract(&snapshot).unwrap())
    }

    fn handler(name: &str, owner: &str, events: &[&str]) -> String {
        let mut out = format!(
            "\n[[method]]\nname = \"{name}\"\ncontaining_type = \"{owner}\"\nstatic = true\n"
        );
        for event in events {
            out.push_str(&format!(
                "[[method.attribute]]\nname = \"OnEvent\"\narguments = [{{ string = \"{event}\" }}]\n"
            ));
        }
        out
    }

    fn raiser(name: &str, owner: &str, event: &str) -> String {
        format!(
            "\n[[method]]\nname = \"{name}\"\ncontaining_type = \"{owner}\"\npartial = \"definition\"\n\
             [[method.attribute]]\nname = \"GeneratedEvent\"\narguments = [{{ string = \"{event}\" }}]\n"
        )
    }

    const TYPES: &str = r#"
[[type]]
key = "a"
name = "Hooks"
namespace = "Game"

[[type]]
key = "b"
name = "Other"
namespace = "Game"

[[type]]
key = "handlers"
name = "Handlers"
namespace = "Game"
"#;

    #[test]
    fn test_binding_group_order_and_absence() {
        let toml = format!(
            "{TYPES}{}{}{}",
            handler("F1", "handlers", &["Logout", "Login"]),
            handler("F2", "handlers", &["Logout"]),
            handler("F3", "handlers", &["Login"]),
        );
        let snapshot = Snapshot::from_toml(&toml).unwrap();
        let decls = extract(&snapshot).unwrap();
        let group = BindingGroup::build(&decls.consumers);

        let names = |event: &str| -> Vec<String> {
            group
                .consumers(event)
                .iter()
                .map(|c| c.method.name.clone())
                .collect()
        };
        assert_eq!(names("Logout"), vec!["F1", "F2"]);
        assert_eq!(names("Login"), vec!["F1", "F3"]);
        assert!(group.consumers("Death").is_empty());
        assert_eq!(group.names().collect::<Vec<_>>(), vec!["Login", "Logout"]);
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_groups_by_containing_type() {
        let toml = format!(
            "{TYPES}{}{}{}{}",
            raiser("RaiseA", "a", "Login"),
            raiser("RaiseB", "b", "Login"),
            raiser("RaiseA2", "a", "Logout"),
            handler("OnLogin", "handlers", &["Login"]),
        );
        let units = bind_from(&toml).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].key, "Game.Hooks");
        assert_eq!(units[1].key, "Game.Other");

        let first: Vec<&str> = units[0]
            .events
            .iter()
            .map(|e| e.producer.method.name.as_str())
            .collect();
        assert_eq!(first, vec!["RaiseA", "RaiseA2"]);
        assert_eq!(units[0].events[0].consumers.len(), 1);
        assert_eq!(units[1].events[0].consumers.len(), 1);
    }

    #[test]
    fn test_unmatched_producer_gets_empty_list() {
        let toml = format!("{TYPES}{}", raiser("RaiseUnused", "a", "Unused"));
        let units = bind_from(&toml).unwrap();
        assert_eq!(units.len(), 1);
        assert!(units[0].events[0].consumers.is_empty());
    }

    #[test]
    fn test_no_producers_no_units() {
        let toml = format!("{TYPES}{}", handler("OnLogin", "handlers", &["Login"]));
        assert!(bind_from(&toml).unwrap().is_empty());
    }

    #[test]
    fn test_no_false_matches() {
        let toml = format!(
            "{TYPES}{}{}",
            handler("OnA", "handlers", &["A"]),
            raiser("RaiseB", "a", "B"),
        );
        let units = bind_from(&toml).unwrap();
        assert!(units[0].events[0].consumers.is_empty());
    }

    #[test]
    fn test_same_display_name_distinct_types_rejected() {
        let toml = r#"
[[type]]
key = "one"
name = "Hooks"

[[type]]
key = "two"
name = "Hooks"

[[method]]
name = "RaiseOne"
containing_type = "one"
partial = "definition"
[[method.attribute]]
name = "GeneratedEvent"
arguments = [{ string = "Login" }]

[[method]]
name = "RaiseTwo"
containing_type = "two"
partial = "definition"
[[method.attribute]]
name = "GeneratedEvent"
arguments = [{ string = "Login" }]
"#;
        let result = bind_from(toml);
        assert!(
            matches!(result, Err(CodeGenError::DuplicateOutput(ref key)) if key == "Hooks"),
            "distinct types must not merge: {:?}",
            result
        );
    }

    #[test]
    fn test_duplicate_completion_rejected() {
        let snapshot = Snapshot::from_toml(&format!("{TYPES}{}", raiser("Raise", "a", "Login")))
            .unwrap();
        let mut decls = extract(&snapshot).unwrap();
        let again = decls.producers[0].clone();
        decls.producers.push(again);

        let result = bind(&decls);
        assert!(
            matches!(result, Err(CodeGenError::DuplicateCompletion(ref s)) if s == "Game.Hooks.Raise"),
            "got {:?}",
            result
        );
    }
}
