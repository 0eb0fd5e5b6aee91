//! `And`, `Or` and `Never`.

use super::{
    BoxedCondition, Condition, ConditionEvent, ConditionEvents, Describe, EvaluatedCondition, Join,
};
use crate::context::EvaluationContext;
use crate::error::ConfigurationError;

/// Several conditions joined by [`Join::And`] or [`Join::Or`].
///
/// Records exactly one joined event per item.
pub struct Joined<T: ?Sized> {
    join: Join,
    conditions: Vec<BoxedCondition<T>>,
}

impl<T: ?Sized> Joined<T> {
    /// Joins `conditions`.
    #[must_use]
    pub fn new(join: Join, conditions: Vec<BoxedCondition<T>>) -> Self {
        Self { join, conditions }
    }

    /// All of `conditions` must hold.
    #[must_use]
    pub fn and(conditions: Vec<BoxedCondition<T>>) -> Self {
        Self::new(Join::And, conditions)
    }

    /// At least one of `conditions` must hold.
    #[must_use]
    pub fn or(conditions: Vec<BoxedCondition<T>>) -> Self {
        Self::new(Join::Or, conditions)
    }
}

impl<T: ?Sized + Describe> Condition<T> for Joined<T> {
    fn description(&self) -> String {
        let separator = match self.join {
            Join::And => " and ",
            Join::Or => " or ",
        };
        self.conditions
            .iter()
            .map(|c| c.description())
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn check(
        &self,
        item: &T,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let evaluations = self
            .conditions
            .iter()
            .map(|condition| {
                let mut sub = ConditionEvents::new();
                condition.check(item, ctx, &mut sub)?;
                Ok(EvaluatedCondition::new(condition.description(), sub))
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;
        if let Some(information) = evaluations.iter().find_map(|e| e.events().information()) {
            events.set_information(information);
        }
        events.add(ConditionEvent::joined(self.join, item.describe(), evaluations));
        Ok(())
    }
}

/// Inverts every event of the wrapped condition.
pub struct Never<T: ?Sized> {
    inner: BoxedCondition<T>,
}

impl<T: ?Sized> Never<T> {
    /// Wraps `inner`.
    pub fn new(inner: impl Condition<T> + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl<T: ?Sized> Condition<T> for Never<T> {
    fn description(&self) -> String {
        format!("never {}", self.inner.description())
    }

    fn check(
        &self,
        item: &T,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let mut sub = ConditionEvents::new();
        self.inner.check(item, ctx, &mut sub)?;
        events.append(sub.inverted());
        Ok(())
    }
}

/// A condition with a replaced description.
pub struct Described<T: ?Sized> {
    inner: BoxedCondition<T>,
    description: String,
}

impl<T: ?Sized> Described<T> {
    /// Wraps `inner` under `description`.
    pub fn new(inner: impl Condition<T> + 'static, description: impl Into<String>) -> Self {
        Self {
            inner: Box::new(inner),
            description: description.into(),
        }
    }
}

impl<T: ?Sized> Condition<T> for Described<T> {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn check(
        &self,
        item: &T,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        self.inner.check(item, ctx, events)
    }
}
