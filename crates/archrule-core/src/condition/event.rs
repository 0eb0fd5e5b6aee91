//! Outcomes recorded by conditions.
//!
//! Every event knows whether it is a violation, which lines describe it,
//! and how to invert itself. Inversion is exact: a joined `And` event turns
//! into an `Or` event over the inverted sub-evaluations (and back), and a
//! quantified event swaps its allowed and violating sub-events while moving
//! to the dual quantifier.
//!
//! Lines of simple events state facts ("`Class <A>` has name matching
//! 'x'") rather than verdicts, so they stay accurate under either polarity.

use super::events::ConditionEvents;
use std::collections::BTreeSet;

/// One recorded outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionEvent {
    /// A single fact about one object.
    Simple(SimpleEvent),
    /// Several conditions evaluated against the same object.
    Joined(JoinedEvent),
    /// One condition evaluated against every item of a collection.
    Quantified(QuantifiedEvent),
}

impl ConditionEvent {
    /// An event whose polarity is given by `satisfied`.
    #[must_use]
    pub fn new(object: impl Into<String>, satisfied: bool, message: impl Into<String>) -> Self {
        Self::Simple(SimpleEvent {
            object: object.into(),
            violation: !satisfied,
            message: message.into(),
        })
    }

    /// A satisfied event.
    #[must_use]
    pub fn satisfied(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(object, true, message)
    }

    /// A violated event.
    #[must_use]
    pub fn violated(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(object, false, message)
    }

    /// Joins the evaluations of several conditions against one object.
    #[must_use]
    pub fn joined(
        join: Join,
        object: impl Into<String>,
        evaluations: Vec<EvaluatedCondition>,
    ) -> Self {
        Self::Joined(JoinedEvent {
            join,
            object: object.into(),
            evaluations,
        })
    }

    /// Lifts the per-item events of a collection to one event.
    #[must_use]
    pub fn quantified(
        quantifier: Quantifier,
        object: impl Into<String>,
        noun: &'static str,
        events: ConditionEvents,
    ) -> Self {
        let (violating, allowed) = events.into_parts();
        Self::Quantified(QuantifiedEvent {
            quantifier,
            object: object.into(),
            noun,
            allowed,
            violating,
        })
    }

    /// Returns true if this event is a violation.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        match self {
            Self::Simple(event) => event.violation,
            Self::Joined(event) => event.join.is_violation(&event.evaluations),
            Self::Quantified(event) => event
                .quantifier
                .is_violation(!event.allowed.is_empty(), !event.violating.is_empty()),
        }
    }

    /// The object the event is about.
    #[must_use]
    pub fn object(&self) -> &str {
        match self {
            Self::Simple(event) => &event.object,
            Self::Joined(event) => &event.object,
            Self::Quantified(event) => &event.object,
        }
    }

    /// Human-readable lines describing the event.
    #[must_use]
    pub fn description_lines(&self) -> Vec<String> {
        match self {
            Self::Simple(event) => vec![event.message.clone()],
            Self::Joined(event) => event.join.description_lines(&event.evaluations),
            Self::Quantified(event) => event.description_lines(),
        }
    }

    /// The logically negated event.
    #[must_use]
    pub fn invert(&self) -> Self {
        match self {
            Self::Simple(event) => Self::Simple(SimpleEvent {
                object: event.object.clone(),
                violation: !event.violation,
                message: event.message.clone(),
            }),
            Self::Joined(event) => Self::Joined(JoinedEvent {
                join: event.join.dual(),
                object: event.object.clone(),
                evaluations: event
                    .evaluations
                    .iter()
                    .map(EvaluatedCondition::inverted)
                    .collect(),
            }),
            Self::Quantified(event) => Self::Quantified(QuantifiedEvent {
                quantifier: event.quantifier.dual(),
                object: event.object.clone(),
                noun: event.noun,
                allowed: event.violating.iter().map(Self::invert).collect(),
                violating: event.allowed.iter().map(Self::invert).collect(),
            }),
        }
    }
}

/// A single fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleEvent {
    object: String,
    violation: bool,
    message: String,
}

/// How sub-evaluations of a [`JoinedEvent`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Join {
    /// Violated if any sub-condition is violated.
    And,
    /// Violated only if every sub-condition is violated.
    Or,
}

impl Join {
    /// The join an inverted event uses.
    #[must_use]
    pub const fn dual(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }

    fn is_violation(self, evaluations: &[EvaluatedCondition]) -> bool {
        match self {
            Self::And => evaluations.iter().any(|e| e.events.contain_violation()),
            Self::Or => evaluations.iter().all(|e| e.events.contain_violation()),
        }
    }

    fn description_lines(self, evaluations: &[EvaluatedCondition]) -> Vec<String> {
        let violations = evaluations.iter().flat_map(|e| e.events.violation_lines());
        match self {
            Self::And => violations.collect::<BTreeSet<_>>().into_iter().collect(),
            Self::Or => vec![violations.collect::<Vec<_>>().join(" and ")],
        }
    }
}

/// The events one condition produced for an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedCondition {
    description: String,
    events: ConditionEvents,
}

impl EvaluatedCondition {
    /// Pairs a condition description with its events.
    #[must_use]
    pub fn new(description: impl Into<String>, events: ConditionEvents) -> Self {
        Self {
            description: description.into(),
            events,
        }
    }

    /// Description of the evaluated condition.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Events the condition recorded.
    #[must_use]
    pub fn events(&self) -> &ConditionEvents {
        &self.events
    }

    fn inverted(&self) -> Self {
        Self {
            description: self.description.clone(),
            events: self.events.inverted(),
        }
    }
}

/// Several conditions joined by [`Join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedEvent {
    join: Join,
    object: String,
    evaluations: Vec<EvaluatedCondition>,
}

impl JoinedEvent {
    /// The join kind.
    #[must_use]
    pub fn join(&self) -> Join {
        self.join
    }

    /// Sub-evaluations in condition order.
    #[must_use]
    pub fn evaluations(&self) -> &[EvaluatedCondition] {
        &self.evaluations
    }
}

/// Quantifier of a [`QuantifiedEvent`].
///
/// The four quantifiers form two dual pairs. Inverting an event moves to
/// the dual and swaps (inverted) allowed and violating sub-events, which is
/// exactly the logical negation:
///
/// | quantifier    | violated when               | lines from |
/// |---------------|-----------------------------|------------|
/// | `NoneMatch`   | some sub-event is allowed   | allowed    |
/// | `NotAllMatch` | no sub-event is violating   | allowed    |
/// | `AllMatch`    | some sub-event is violating | violating  |
/// | `AnyMatch`    | no sub-event is allowed     | violating  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// No item may satisfy the condition.
    NoneMatch,
    /// Not every item may fail the condition.
    NotAllMatch,
    /// Every item must satisfy the condition.
    AllMatch,
    /// At least one item must satisfy the condition.
    AnyMatch,
}

impl Quantifier {
    /// The quantifier an inverted event uses.
    #[must_use]
    pub const fn dual(self) -> Self {
        match self {
            Self::NoneMatch => Self::NotAllMatch,
            Self::NotAllMatch => Self::NoneMatch,
            Self::AllMatch => Self::AnyMatch,
            Self::AnyMatch => Self::AllMatch,
        }
    }

    fn is_violation(self, any_allowed: bool, any_violating: bool) -> bool {
        match self {
            Self::NoneMatch => any_allowed,
            Self::NotAllMatch => !any_violating,
            Self::AllMatch => any_violating,
            Self::AnyMatch => !any_allowed,
        }
    }

    fn reports_allowed(self) -> bool {
        matches!(self, Self::NoneMatch | Self::NotAllMatch)
    }
}

/// One condition evaluated over the items of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantifiedEvent {
    quantifier: Quantifier,
    object: String,
    noun: &'static str,
    allowed: Vec<ConditionEvent>,
    violating: Vec<ConditionEvent>,
}

impl QuantifiedEvent {
    /// The quantifier.
    #[must_use]
    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    /// Sub-events that satisfied the item condition.
    #[must_use]
    pub fn allowed(&self) -> &[ConditionEvent] {
        &self.allowed
    }

    /// Sub-events that violated the item condition.
    #[must_use]
    pub fn violating(&self) -> &[ConditionEvent] {
        &self.violating
    }

    fn description_lines(&self) -> Vec<String> {
        let source = if self.quantifier.reports_allowed() {
            &self.allowed
        } else {
            &self.violating
        };
        let lines: BTreeSet<String> = source
            .iter()
            .flat_map(ConditionEvent::description_lines)
            .collect();
        if lines.is_empty() && self.allowed.is_empty() && self.violating.is_empty() {
            return vec![format!("{} has no {}", self.object, self.noun)];
        }
        lines.into_iter().collect()
    }
}
