//! Lifting item conditions to collections.

use super::{BoxedCondition, Condition, ConditionEvent, ConditionEvents, Describe, Quantifier};
use crate::context::EvaluationContext;
use crate::error::ConfigurationError;

/// A collection-level condition built from an item condition.
pub struct Quantify<T: ?Sized> {
    quantifier: Quantifier,
    condition: BoxedCondition<T>,
    noun: &'static str,
}

/// Violated if at least one item satisfies `condition`.
///
/// The event lists the satisfying items.
pub fn contains_any<T: ?Sized>(condition: impl Condition<T> + 'static) -> Quantify<T> {
    Quantify {
        quantifier: Quantifier::NoneMatch,
        condition: Box::new(condition),
        noun: "elements",
    }
}

/// Violated if at least one item fails `condition`.
///
/// The event lists the failing items, deduplicated and sorted.
pub fn contains_only<T: ?Sized>(condition: impl Condition<T> + 'static) -> Quantify<T> {
    Quantify {
        quantifier: Quantifier::AllMatch,
        condition: Box::new(condition),
        noun: "elements",
    }
}

impl<T: ?Sized> Quantify<T> {
    /// Names the items in the "has no ..." line of an empty collection.
    #[must_use]
    pub fn items_named(mut self, noun: &'static str) -> Self {
        self.noun = noun;
        self
    }

    /// The quantifier of the events this condition records.
    #[must_use]
    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    /// Checks each of `items` and records one event on behalf of `object`.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors of the item condition.
    pub fn check_items<'a, I>(
        &self,
        object: String,
        items: I,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut sub = ConditionEvents::new();
        for item in items {
            self.condition.check(item, ctx, &mut sub)?;
        }
        events.add(ConditionEvent::quantified(
            self.quantifier,
            object,
            self.noun,
            sub,
        ));
        Ok(())
    }

    pub(crate) fn item_description(&self) -> String {
        self.condition.description()
    }
}

impl<T: Describe> Condition<[T]> for Quantify<T> {
    fn description(&self) -> String {
        match self.quantifier {
            Quantifier::NoneMatch => format!("contain no element that {}", self.item_description()),
            _ => format!("contain only elements that {}", self.item_description()),
        }
    }

    fn check(
        &self,
        items: &[T],
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        self.check_items(items.describe(), items, ctx, events)
    }
}
