//! Property tests: event inversion, quantifiers and cycle detection.

use archrule_core::condition::{contains_any, contains_only, Joined};
use archrule_core::{
    be_free_of_cycles, ArchRule, BoxedCondition, ComponentRule, Condition, ConditionEvent,
    ConditionEvents, Config, ConfigurationError, DependencySpec, Describe, ElementSpec,
    EvaluationContext, Graph, SliceAssignment,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy)]
struct Flag(bool);

impl Describe for Flag {
    fn describe(&self) -> String {
        format!("flag {}", self.0)
    }
}

/// Satisfied for set flags.
struct IsSet;

impl Condition<Flag> for IsSet {
    fn description(&self) -> String {
        "be set".to_string()
    }

    fn check(
        &self,
        item: &Flag,
        _ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        events.add(ConditionEvent::new(
            item.describe(),
            item.0,
            format!("{} checked", item.describe()),
        ));
        Ok(())
    }
}

/// Ignores the item; always yields `outcome`.
struct Fixed(bool);

impl Condition<Flag> for Fixed {
    fn description(&self) -> String {
        format!("be {}", self.0)
    }

    fn check(
        &self,
        item: &Flag,
        _ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        events.add(ConditionEvent::new(item.describe(), self.0, format!("fixed {}", self.0)));
        Ok(())
    }
}

fn evaluate<T: ?Sized>(condition: &dyn Condition<T>, item: &T) -> ConditionEvents {
    let graph = Graph::builder().build();
    let config = Config::default();
    let ctx = EvaluationContext::new(&graph, &config);
    let mut events = ConditionEvents::new();
    condition
        .check(item, &ctx, &mut events)
        .expect("test conditions never fail");
    events
}

fn fixed(outcomes: &[bool]) -> Vec<BoxedCondition<Flag>> {
    outcomes
        .iter()
        .map(|outcome| Box::new(Fixed(*outcome)) as BoxedCondition<Flag>)
        .collect()
}

fn slice_graph(slices: usize, edges: &[(usize, usize)]) -> Graph {
    let mut builder = Graph::builder();
    for index in 0..slices {
        builder
            .add_element(ElementSpec::class(format!("app.s{index}.C{index}")))
            .expect("unique element");
    }
    for (origin, target) in edges {
        builder
            .add_dependency(DependencySpec::new(
                format!("app.s{origin}.C{origin}"),
                format!("app.s{target}.C{target}"),
                format!("s{origin} uses s{target}"),
            ))
            .expect("known elements");
    }
    builder.build()
}

fn cycle_violations(graph: &Graph) -> Vec<String> {
    ComponentRule::slices(SliceAssignment::matching("app.(*)..").expect("valid pattern"))
        .should(be_free_of_cycles())
        .allow_empty_should(true)
        .evaluate(graph)
        .expect("evaluation succeeds")
        .violations()
        .to_vec()
}

/// Distinct edges between different slices.
fn edges(slices: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::btree_set((0..slices, 0..slices), 0..slices * 2).prop_map(|set: BTreeSet<_>| {
        set.into_iter().filter(|(origin, target)| origin != target).collect()
    })
}

proptest! {
    #[test]
    fn and_and_or_are_dual_under_inversion(outcomes in prop::collection::vec(any::<bool>(), 1..5)) {
        let and = evaluate(&Joined::and(fixed(&outcomes)), &Flag(true));
        let or = evaluate(&Joined::or(fixed(&outcomes)), &Flag(true));

        prop_assert_eq!(and.contain_violation(), !outcomes.iter().all(|o| *o));
        prop_assert_eq!(or.contain_violation(), !outcomes.iter().any(|o| *o));
        prop_assert_eq!(and.inverted().contain_violation(), !and.contain_violation());
        prop_assert_eq!(or.inverted().contain_violation(), !or.contain_violation());
    }

    #[test]
    fn quantifiers_stay_distinct(flags in prop::collection::vec(any::<bool>(), 0..8)) {
        let items: Vec<Flag> = flags.iter().copied().map(Flag).collect();
        let any_set = flags.iter().any(|f| *f);
        let any_unset = flags.iter().any(|f| !*f);

        let none_set = evaluate(&contains_any(IsSet), items.as_slice());
        prop_assert_eq!(none_set.contain_violation(), any_set);
        prop_assert_eq!(none_set.inverted().contain_violation(), !any_set);

        let all_set = evaluate(&contains_only(IsSet), items.as_slice());
        prop_assert_eq!(all_set.contain_violation(), any_unset);
        prop_assert_eq!(all_set.inverted().contain_violation(), !any_unset);
    }

    #[test]
    fn cycle_reports_ignore_insertion_order(
        (edges, shuffled) in edges(5).prop_flat_map(|edges| {
            let shuffled = Just(edges.clone()).prop_shuffle();
            (Just(edges), shuffled)
        })
    ) {
        let forward = cycle_violations(&slice_graph(5, &edges));
        let permuted = cycle_violations(&slice_graph(5, &shuffled));
        prop_assert_eq!(forward, permuted);
    }

    #[test]
    fn forward_only_edges_have_no_cycle(edges in edges(6)) {
        let forward: Vec<(usize, usize)> = edges
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert!(cycle_violations(&slice_graph(6, &forward)).is_empty());
    }

    #[test]
    fn two_way_edge_is_always_a_cycle(a in 0usize..4, b in 0usize..4) {
        prop_assume!(a != b);
        let violations = cycle_violations(&slice_graph(4, &[(a, b), (b, a)]));
        prop_assert_eq!(violations.len(), 1);
    }
}
