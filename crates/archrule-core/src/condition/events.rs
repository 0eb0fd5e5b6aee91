//! Accumulator for [`ConditionEvent`]s.

use super::event::ConditionEvent;

/// Events recorded while checking a condition, split by polarity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionEvents {
    violating: Vec<ConditionEvent>,
    allowed: Vec<ConditionEvent>,
    information: Option<String>,
}

impl ConditionEvents {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event on the side its polarity dictates.
    pub fn add(&mut self, event: ConditionEvent) {
        if event.is_violation() {
            self.violating.push(event);
        } else {
            self.allowed.push(event);
        }
    }

    /// Violating events in insertion order.
    #[must_use]
    pub fn violating(&self) -> &[ConditionEvent] {
        &self.violating
    }

    /// Allowed events in insertion order.
    #[must_use]
    pub fn allowed(&self) -> &[ConditionEvent] {
        &self.allowed
    }

    /// Returns true if any violation was recorded.
    #[must_use]
    pub fn contain_violation(&self) -> bool {
        !self.violating.is_empty()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violating.is_empty() && self.allowed.is_empty()
    }

    /// Description lines of all violating events, flattened.
    #[must_use]
    pub fn violation_lines(&self) -> Vec<String> {
        self.violating
            .iter()
            .flat_map(ConditionEvent::description_lines)
            .collect()
    }

    /// Sets the summary shown below the violations, e.g. when a limit
    /// truncated reporting.
    pub fn set_information(&mut self, information: impl Into<String>) {
        self.information = Some(information.into());
    }

    /// The summary, if any.
    #[must_use]
    pub fn information(&self) -> Option<&str> {
        self.information.as_deref()
    }

    /// Every event inverted and re-partitioned by its new polarity.
    #[must_use]
    pub fn inverted(&self) -> Self {
        let mut inverted = Self {
            information: self.information.clone(),
            ..Self::default()
        };
        for event in self.violating.iter().chain(&self.allowed) {
            inverted.add(event.invert());
        }
        inverted
    }

    /// Moves all events of `other` into `self`.
    pub fn append(&mut self, other: Self) {
        self.violating.extend(other.violating);
        self.allowed.extend(other.allowed);
        if other.information.is_some() {
            self.information = other.information;
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<ConditionEvent>, Vec<ConditionEvent>) {
        (self.violating, self.allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_partitions_by_polarity() {
        let mut events = ConditionEvents::new();
        assert!(events.is_empty());
        events.add(ConditionEvent::satisfied("A", "fine"));
        events.add(ConditionEvent::violated("B", "broken"));
        assert!(events.contain_violation());
        assert_eq!(events.allowed().len(), 1);
        assert_eq!(events.violation_lines(), vec!["broken"]);
    }

    #[test]
    fn inverted_swaps_sides_and_keeps_information() {
        let mut events = ConditionEvents::new();
        events.add(ConditionEvent::satisfied("A", "fine"));
        events.set_information("limit reached");
        let inverted = events.inverted();
        assert_eq!(inverted.violation_lines(), vec!["fine"]);
        assert!(inverted.allowed().is_empty());
        assert_eq!(inverted.information(), Some("limit reached"));
    }
}
