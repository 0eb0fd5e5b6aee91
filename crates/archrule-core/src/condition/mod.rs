//! Composable conditions that record events instead of returning booleans.
//!
//! A [`Condition`] checks one item and writes [`ConditionEvent`]s into a
//! [`ConditionEvents`] accumulator. Conditions compose:
//!
//! ```text
//! and / or ──► Joined (one event per item, inverts to its dual join)
//! never    ──► Never  (re-runs the inner condition, inverts every event)
//! contains_any / contains_only ──► Quantify (collection-level)
//! ```
//!
//! A rule violation is never an `Err`; `Err` means the condition is
//! misconfigured and the evaluation cannot proceed.

mod combinators;
pub mod elements;
mod event;
mod events;
mod quantifiers;

pub use combinators::{Described, Joined, Never};
pub use event::{
    ConditionEvent, EvaluatedCondition, Join, JoinedEvent, QuantifiedEvent, Quantifier,
    SimpleEvent,
};
pub use events::ConditionEvents;
pub use quantifiers::{contains_any, contains_only, Quantify};

use crate::context::EvaluationContext;
use crate::error::ConfigurationError;
use crate::graph::{CodeElement, Dependency};
use std::sync::Arc;

/// A named check over items of type `T`.
pub trait Condition<T: ?Sized>: Send + Sync {
    /// Description used in rule text, phrased to follow "should".
    fn description(&self) -> String;

    /// Checks `item`, recording outcomes in `events`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] only if the condition cannot be
    /// evaluated at all. Violations are recorded as events.
    fn check(
        &self,
        item: &T,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError>;
}

/// Boxed condition.
pub type BoxedCondition<T> = Box<dyn Condition<T>>;

impl<T: ?Sized, C: Condition<T> + ?Sized> Condition<T> for Box<C> {
    fn description(&self) -> String {
        (**self).description()
    }

    fn check(
        &self,
        item: &T,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        (**self).check(item, ctx, events)
    }
}

/// How an item names itself in events.
pub trait Describe {
    /// Short human-readable name.
    fn describe(&self) -> String;
}

impl Describe for CodeElement {
    fn describe(&self) -> String {
        self.to_string()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl Describe for Dependency {
    fn describe(&self) -> String {
        self.description_line()
    }
}

impl<T: Describe> Describe for [T] {
    fn describe(&self) -> String {
        let items: Vec<String> = self.iter().map(Describe::describe).collect();
        format!("[{}]", items.join(", "))
    }
}

/// Combinator methods available on every sized condition.
pub trait ConditionExt<T: ?Sized + Describe + 'static>: Condition<T> + Sized + 'static {
    /// Violated if either condition is violated.
    fn and<C: Condition<T> + 'static>(self, other: C) -> Joined<T> {
        Joined::new(Join::And, vec![Box::new(self), Box::new(other)])
    }

    /// Violated only if both conditions are violated.
    fn or<C: Condition<T> + 'static>(self, other: C) -> Joined<T> {
        Joined::new(Join::Or, vec![Box::new(self), Box::new(other)])
    }

    /// Violated exactly when `self` is satisfied.
    fn never(self) -> Never<T> {
        Never::new(self)
    }

    /// Replaces the description, keeping the behavior.
    fn described_as(self, description: impl Into<String>) -> Described<T> {
        Described::new(self, description)
    }
}

impl<T: ?Sized + Describe + 'static, C: Condition<T> + 'static> ConditionExt<T> for C {}

/// Inverts `condition`: violated exactly when it is satisfied.
pub fn never<T: ?Sized + Describe + 'static>(condition: impl Condition<T> + 'static) -> Never<T> {
    Never::new(condition)
}
