//! Shape Validation
//!
//! An optional pass over bound units that reports problems the generated
//! text would only reveal when it is compiled: consumers whose parameters
//! cannot take the producer's forwarded arguments, unreachable consumers,
//! and ambiguous producer annotations.
//!
//! Validation never changes what is generated. [`crate::generate`] does
//! not run it; callers opt in (the CLI does with `check` and
//! `build --check`).
//!
//! # Checks
//!
//! | id                         | severity | meaning                                      |
//! |----------------------------|----------|----------------------------------------------|
//! | `parameter-count-mismatch` | error    | consumer takes a different number of params  |
//! | `parameter-mode-mismatch`  | error    | `ref`/`out`/`in` differs at a position       |
//! | `parameter-type-mismatch`  | warning  | declared type text differs at a position     |
//! | `ambiguous-event-name`     | warning  | several differing `GeneratedEvent` names     |
//! | `private-consumer`         | warning  | private consumer outside the producer's type |
//! | `unused-event`             | hint     | producer with no consumers                   |

use crate::binder::{BoundProducer, SynthesisUnit};
use crate::extract::{ConsumerDecl, GENERATED_EVENT_ATTRIBUTE, bound_name};
use evgen_core::Accessibility;
use serde::Deserialize;
use std::fmt;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        f.write_str(s)
    }
}

/// A validation finding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Check ID (`parameter-count-mismatch`, ...)
    pub id: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Output key of the unit the producer belongs to
    pub unit: String,
    /// Producer method name
    pub producer: String,
    /// Qualified consumer name, when the finding is about one consumer
    pub consumer: Option<String>,
}

/// Run every check over `units`.
///
/// Diagnostics are ordered by unit key, then producer, then check id, so
/// repeated runs print identical reports.
pub fn validate(units: &[SynthesisUnit]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for unit in units {
        for bound in &unit.events {
            check_producer(unit, bound, &mut diagnostics);
            for consumer in &bound.consumers {
                check_consumer(unit, bound, consumer, &mut diagnostics);
            }
        }
    }
    diagnostics.sort_by(|a, b| {
        (&a.unit, &a.producer, a.id, &a.consumer).cmp(&(&b.unit, &b.producer, b.id, &b.consumer))
    });
    diagnostics
}

fn check_producer(unit: &SynthesisUnit, bound: &BoundProducer, out: &mut Vec<Diagnostic>) {
    let producer = &bound.producer;
    let diagnostic = |id, severity, message| Diagnostic {
        id,
        severity,
        message,
        unit: unit.key.clone(),
        producer: producer.method.name.clone(),
        consumer: None,
    };

    let mut names: Vec<&str> = producer
        .method
        .attributes_named(GENERATED_EVENT_ATTRIBUTE)
        .filter_map(bound_name)
        .collect();
    names.dedup();
    if names.len() > 1 {
        out.push(diagnostic(
            "ambiguous-event-name",
            Severity::Warning,
            format!(
                "'{}' names events {}; only '{}' is bound",
                producer.method.name,
                quoted_list(&names),
                producer.event_name
            ),
        ));
    }

    if bound.consumers.is_empty() {
        out.push(diagnostic(
            "unused-event",
            Severity::Hint,
            format!(
                "no OnEvent handler is bound to '{}'; '{}' will do nothing",
                producer.event_name, producer.method.name
            ),
        ));
    }
}

fn check_consumer(
    unit: &SynthesisUnit,
    bound: &BoundProducer,
    consumer: &ConsumerDecl,
    out: &mut Vec<Diagnostic>,
) {
    let producer = &bound.producer.method;
    let consumer_name = format!("{}.{}", consumer.owner, consumer.method.name);
    let diagnostic = |id, severity, message| Diagnostic {
        id,
        severity,
        message,
        unit: unit.key.clone(),
        producer: producer.name.clone(),
        consumer: Some(consumer_name.clone()),
    };

    let reachable = unit
        .chain
        .iter()
        .any(|ty| ty.id == consumer.method.containing_type);
    if consumer.method.accessibility == Accessibility::Private && !reachable {
        out.push(diagnostic(
            "private-consumer",
            Severity::Warning,
            format!(
                "'{}' is private and cannot be called from '{}'",
                consumer_name, unit.key
            ),
        ));
    }

    let expected = &producer.parameters;
    let actual = &consumer.method.parameters;
    if expected.len() != actual.len() {
        out.push(diagnostic(
            "parameter-count-mismatch",
            Severity::Error,
            format!(
                "'{}' takes {} parameter(s) but '{}' forwards {}",
                consumer_name,
                actual.len(),
                producer.name,
                expected.len()
            ),
        ));
        return;
    }

    for (position, (ours, theirs)) in expected.iter().zip(actual).enumerate() {
        if ours.ref_kind != theirs.ref_kind {
            out.push(diagnostic(
                "parameter-mode-mismatch",
                Severity::Error,
                format!(
                    "parameter {} of '{}' is passed as {:?} but '{}' declares {:?}",
                    position + 1,
                    producer.name,
                    ours.ref_kind,
                    consumer_name,
                    theirs.ref_kind
                ),
            ));
        } else if ours.ty.trim() != theirs.ty.trim() {
            out.push(diagnostic(
                "parameter-type-mismatch",
                Severity::Warning,
                format!(
                    "parameter {} of '{}' is '{}' but '{}' declares '{}'",
                    position + 1,
                    producer.name,
                    ours.ty,
                    consumer_name,
                    theirs.ty
                ),
            ));
        }
    }
}

fn quoted_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    quoted.join(", ")
}

/// Format diagnostics for display
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for d in diagnostics {
        output.push_str(&format!(
            "{}.{}: {} [{}]: {}\n",
            d.unit, d.producer, d.severity, d.id, d.message
        ));
    }
    output
}
