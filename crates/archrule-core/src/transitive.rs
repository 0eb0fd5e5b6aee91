//! Transitive dependency search.
//!
//! Starting from the direct dependency targets of an element, the search
//! walks dependencies that stay outside the evaluation's subject set until
//! it reaches an element matching a predicate. The walk uses an explicit
//! stack, so very deep chains cost heap, not call stack. Without a depth
//! limit every element is entered once. With a limit, an element is entered
//! again only when reached by a strictly shorter path, which still
//! terminates on cyclic input.

use crate::condition::{Condition, ConditionEvent, ConditionEvents};
use crate::context::EvaluationContext;
use crate::error::ConfigurationError;
use crate::graph::{CodeElement, ElementId};
use crate::predicate::ElementPredicate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Path search over dependencies leaving the subject set.
#[derive(Debug, Clone)]
pub struct TransitiveDependencyFinder<'c, 'g> {
    ctx: &'c EvaluationContext<'g>,
    max_depth: Option<usize>,
}

impl<'c, 'g> TransitiveDependencyFinder<'c, 'g> {
    /// A finder using the depth limit of the context's settings.
    #[must_use]
    pub fn new(ctx: &'c EvaluationContext<'g>) -> Self {
        Self {
            ctx,
            max_depth: ctx.config().transitive.max_depth,
        }
    }

    /// Overrides the maximum number of dependency hops from the origin.
    #[must_use]
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Distinct targets of `element`'s dependencies that lie outside the
    /// subject set, in dependency order.
    #[must_use]
    pub fn external_targets(&self, element: &CodeElement) -> Vec<&'g Arc<CodeElement>> {
        let mut seen = HashSet::new();
        self.ctx
            .graph()
            .dependencies_from(element)
            .iter()
            .map(|dependency| dependency.target())
            .filter(|target| !self.ctx.is_subject(target) && seen.insert(target.id()))
            .collect()
    }

    /// One path per direct external target that leads to a match.
    ///
    /// Every path starts with `origin` and ends with the matching element.
    #[must_use]
    pub fn find_paths(
        &self,
        origin: &'g Arc<CodeElement>,
        predicate: &ElementPredicate,
    ) -> Vec<Vec<&'g Arc<CodeElement>>> {
        self.external_targets(origin)
            .into_iter()
            .filter_map(|start| self.path_from(start, predicate))
            .map(|path| {
                let mut full = Vec::with_capacity(path.len() + 1);
                full.push(origin);
                full.extend(path);
                full
            })
            .collect()
    }

    /// Some path from `start` to an element matching `predicate`, or `None`.
    ///
    /// `start` counts as the first hop. The path is not necessarily the
    /// shortest one.
    #[must_use]
    pub fn path_from(
        &self,
        start: &'g Arc<CodeElement>,
        predicate: &ElementPredicate,
    ) -> Option<Vec<&'g Arc<CodeElement>>> {
        if self.max_depth == Some(0) {
            return None;
        }
        if predicate.test(start) {
            return Some(vec![start]);
        }

        // shallowest path length each element was entered with
        let mut entered: HashMap<ElementId, usize> = HashMap::from([(start.id(), 1)]);
        let mut path = vec![start];
        let mut stack = vec![(self.external_targets(start), 0_usize)];

        while let Some((candidates, cursor)) = stack.last_mut() {
            let Some(&next) = candidates.get(*cursor) else {
                stack.pop();
                path.pop();
                continue;
            };
            *cursor += 1;
            let depth = path.len() + 1;
            if !self.should_enter(&mut entered, next.id(), depth) {
                continue;
            }
            path.push(next);
            if predicate.test(next) {
                return Some(path);
            }
            stack.push((self.external_targets(next), 0));
        }
        None
    }

    fn should_enter(
        &self,
        entered: &mut HashMap<ElementId, usize>,
        id: ElementId,
        depth: usize,
    ) -> bool {
        let Some(max) = self.max_depth else {
            return entered.insert(id, depth).is_none();
        };
        if depth > max || entered.get(&id).is_some_and(|&shallowest| shallowest <= depth) {
            return false;
        }
        entered.insert(id, depth);
        true
    }
}

/// `transitively depend on elements that <predicate>`.
pub struct TransitivelyDependOn {
    predicate: ElementPredicate,
}

/// Satisfied once per direct external dependency that leads to a match;
/// violated if none does.
#[must_use]
pub fn transitively_depend_on_elements_that(predicate: ElementPredicate) -> TransitivelyDependOn {
    TransitivelyDependOn { predicate }
}

impl Condition<CodeElement> for TransitivelyDependOn {
    fn description(&self) -> String {
        format!("transitively depend on elements that {}", self.predicate)
    }

    fn check(
        &self,
        element: &CodeElement,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let Some(origin) = ctx.graph().get(element.id()) else {
            return Ok(());
        };
        let paths = TransitiveDependencyFinder::new(ctx).find_paths(origin, &self.predicate);

        if paths.is_empty() {
            events.add(ConditionEvent::violated(
                element.to_string(),
                format!("{element} does not transitively depend on any matching element"),
            ));
            return Ok(());
        }
        for path in paths {
            events.add(ConditionEvent::satisfied(element.to_string(), describe_path(&path)));
        }
        Ok(())
    }
}

fn describe_path(path: &[&Arc<CodeElement>]) -> String {
    let (Some(origin), Some(target)) = (path.first(), path.last()) else {
        return String::new();
    };
    if path.len() <= 2 {
        return format!("{origin} transitively depends on {target}");
    }
    let names: Vec<&str> = path.iter().map(|element| element.name()).collect();
    format!(
        "{origin} transitively depends on {target} by [{}]",
        names.join(" -> ")
    )
}
