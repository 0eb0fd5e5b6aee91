//! Cycle detection among components.
//!
//! Strongly connected components of the component graph are found with
//! Tarjan's algorithm. Every SCC with more than one member contains at least
//! one cycle; its elementary cycles are then enumerated with Johnson's
//! blocked sets, driven by an explicit stack, so each hop can be reported
//! with its element-level evidence. Work between two reported cycles stays
//! linear in the size of the SCC.
//!
//! Every cyclic SCC reports at least one cycle. The configured limit only
//! bounds how many further cycles are listed.
//!
//! Determinism: components are numbered in name order and successors are
//! visited in name order. Within an SCC, cycles are enumerated starting from
//! the smallest member name; each elementary cycle is reported once, rooted
//! at its smallest member.

use crate::component::{
    Component, ComponentDependencies, ComponentDependency, ComponentId, Components, IgnoreFilter,
    IgnoreDependencies,
};
use crate::condition::{Condition, ConditionEvent, ConditionEvents};
use crate::context::EvaluationContext;
use crate::error::ConfigurationError;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use tracing::{debug, warn};

/// A closed chain of component dependencies.
#[derive(Debug, Clone)]
pub struct Cycle<'d, 'a> {
    edges: Vec<&'d ComponentDependency<'a>>,
}

impl<'d, 'a> Cycle<'d, 'a> {
    /// Hops in order; the last hop's target is the first hop's origin.
    #[must_use]
    pub fn edges(&self) -> &[&'d ComponentDependency<'a>] {
        &self.edges
    }

    /// Components in cycle order, without repeating the start.
    #[must_use]
    pub fn components(&self) -> Vec<&'a Component> {
        self.edges.iter().map(|edge| edge.origin()).collect()
    }

    /// Component names joined by ` -> `, closing on the start.
    #[must_use]
    pub fn path(&self) -> String {
        let mut names: Vec<&str> = self.edges.iter().map(|e| e.origin().name()).collect();
        if let Some(first) = self.edges.first() {
            names.push(first.origin().name());
        }
        names.join(" -> ")
    }

    /// Multi-line report listing up to `max_evidences` dependencies per hop.
    #[must_use]
    pub fn report(&self, max_evidences: usize) -> String {
        let mut out = String::from("Cycle detected: ");
        let names = self.components();
        for name in names.iter().map(|c| c.name()) {
            let _ = write!(out, "{name} ->\n                ");
        }
        if let Some(first) = names.first() {
            out.push_str(first.name());
        }
        for (index, edge) in self.edges.iter().enumerate() {
            let _ = write!(out, "\n  {}. Dependencies of {}", index + 1, edge.origin().name());
            for evidence in edge.evidences().iter().take(max_evidences) {
                let _ = write!(out, "\n    - {}", evidence.description_line());
            }
            let omitted = edge.evidences().len().saturating_sub(max_evidences);
            if omitted > 0 {
                let _ = write!(out, "\n    ({omitted} further dependencies have been omitted...)");
            }
        }
        out
    }
}

/// Outcome of a cycle search.
#[derive(Debug, Clone, Default)]
pub struct CycleSearch<'d, 'a> {
    /// Cycles found, SCC by SCC.
    pub cycles: Vec<Cycle<'d, 'a>>,
    /// Number of strongly connected components with more than one member.
    pub cyclic_components: usize,
    /// True if cycles were left out because of the configured limit.
    pub limit_reached: bool,
}

/// Finds cycles in the component graph.
///
/// At most `max_cycles` cycles are reported, except that every cyclic SCC
/// contributes at least one.
#[must_use]
pub fn find_cycles<'d, 'a>(
    components: &Components,
    dependencies: &'d ComponentDependencies<'a>,
    max_cycles: usize,
) -> CycleSearch<'d, 'a> {
    let ids: Vec<ComponentId> = components.iter().map(Component::id).collect();

    let mut graph: DiGraph<ComponentId, ()> = DiGraph::with_capacity(ids.len(), dependencies.len());
    for id in &ids {
        graph.add_node(*id);
    }
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    for dependency in dependencies.iter() {
        let (origin, target) = (dependency.origin().id().index(), dependency.target().id().index());
        graph.add_edge(NodeIndex::new(origin), NodeIndex::new(target), ());
        // already in target-name order per origin
        successors[origin].push(target);
    }

    let mut sccs: Vec<Vec<usize>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut members: Vec<usize> = scc.into_iter().map(NodeIndex::index).collect();
            members.sort_unstable();
            members
        })
        .collect();
    sccs.sort_unstable_by_key(|members| members.first().copied());
    debug!(
        "Cycle search over {} components: {} cyclic SCCs",
        ids.len(),
        sccs.len()
    );

    let mut search = CycleSearch {
        cyclic_components: sccs.len(),
        ..CycleSearch::default()
    };
    for members in &sccs {
        let allowance = max_cycles.saturating_sub(search.cycles.len()).max(1);
        let mut paths = elementary_cycles(members, &successors, allowance + 1);
        if paths.len() > allowance {
            paths.truncate(allowance);
            search.limit_reached = true;
        }
        for path in paths {
            search.cycles.push(to_cycle(&path, &ids, dependencies));
        }
    }
    search
}

/// One level of the circuit search.
struct Frame {
    node: usize,
    candidates: Vec<usize>,
    cursor: usize,
    closed: bool,
}

/// Elementary cycles of one SCC as node paths (start not repeated), at
/// most `limit` of them.
fn elementary_cycles(
    members: &[usize],
    successors: &[Vec<usize>],
    limit: usize,
) -> Vec<Vec<usize>> {
    let mut found = Vec::new();
    if limit == 0 {
        return found;
    }
    let in_scc: HashSet<usize> = members.iter().copied().collect();

    for &start in members {
        let next_of = |node: usize| -> Vec<usize> {
            successors[node]
                .iter()
                .copied()
                .filter(|n| *n >= start && in_scc.contains(n))
                .collect()
        };

        let mut blocked: HashSet<usize> = HashSet::from([start]);
        // nodes to unblock once the key node is unblocked
        let mut waiting: HashMap<usize, HashSet<usize>> = HashMap::new();
        let mut path = vec![start];
        let mut stack = vec![Frame {
            node: start,
            candidates: next_of(start),
            cursor: 0,
            closed: false,
        }];

        while let Some(frame) = stack.last_mut() {
            if let Some(&next) = frame.candidates.get(frame.cursor) {
                frame.cursor += 1;
                if next == start {
                    frame.closed = true;
                    found.push(path.clone());
                    if found.len() >= limit {
                        return found;
                    }
                } else if blocked.insert(next) {
                    path.push(next);
                    stack.push(Frame {
                        node: next,
                        candidates: next_of(next),
                        cursor: 0,
                        closed: false,
                    });
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            path.pop();
            if done.closed {
                unblock(done.node, &mut blocked, &mut waiting);
                if let Some(parent) = stack.last_mut() {
                    parent.closed = true;
                }
            } else {
                for candidate in done.candidates {
                    waiting.entry(candidate).or_default().insert(done.node);
                }
            }
        }
    }
    found
}

fn unblock(
    node: usize,
    blocked: &mut HashSet<usize>,
    waiting: &mut HashMap<usize, HashSet<usize>>,
) {
    let mut pending = vec![node];
    while let Some(current) = pending.pop() {
        blocked.remove(&current);
        if let Some(nodes) = waiting.remove(&current) {
            pending.extend(nodes.into_iter().filter(|n| blocked.contains(n)));
        }
    }
}

fn to_cycle<'d, 'a>(
    path: &[usize],
    ids: &[ComponentId],
    dependencies: &'d ComponentDependencies<'a>,
) -> Cycle<'d, 'a> {
    let hops = path.iter().zip(path.iter().cycle().skip(1));
    Cycle {
        edges: hops
            .filter_map(|(from, to)| dependencies.get(ids[*from], ids[*to]))
            .collect(),
    }
}

/// `be free of cycles`: one violation per detected cycle.
#[derive(Debug, Clone, Default)]
pub struct BeFreeOfCycles {
    ignore: IgnoreFilter,
}

/// Components must not depend on each other cyclically.
#[must_use]
pub fn be_free_of_cycles() -> BeFreeOfCycles {
    BeFreeOfCycles::default()
}

impl IgnoreDependencies for BeFreeOfCycles {
    fn ignore_filter_mut(&mut self) -> &mut IgnoreFilter {
        &mut self.ignore
    }
}

impl Condition<Components> for BeFreeOfCycles {
    fn description(&self) -> String {
        "be free of cycles".to_string()
    }

    fn check(
        &self,
        components: &Components,
        ctx: &EvaluationContext<'_>,
        events: &mut ConditionEvents,
    ) -> Result<(), ConfigurationError> {
        let settings = &ctx.config().cycles;
        let dependencies = ComponentDependencies::derive(
            components,
            self.ignore.retain(ctx.graph().dependencies()),
        );
        let search = find_cycles(components, &dependencies, settings.max_number_to_detect);

        for cycle in &search.cycles {
            events.add(ConditionEvent::violated(
                cycle.path(),
                cycle.report(settings.max_dependencies_per_edge),
            ));
        }
        if search.limit_reached {
            warn!(
                "Cycle limit of {} reached; further cycles are not reported",
                settings.max_number_to_detect
            );
            events.set_information(format!(
                "Number of cycles found exceeds the configured limit ({}). Further cycles were not \
                 reported; raise `cycles.max_number_to_detect` to see more",
                settings.max_number_to_detect
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::SliceAssignment;
    use crate::config::Config;
    use crate::graph::{DependencySpec, ElementSpec, Graph};

    fn sliced_graph(edges: &[(&str, &str)]) -> Graph {
        let mut builder = Graph::builder();
        let mut names: Vec<&str> = edges.iter().flat_map(|(a, b)| [*a, *b]).collect();
        names.sort_unstable();
        names.dedup();
        for name in &names {
            builder
                .add_element(ElementSpec::class(format!("app.{name}.Type")))
                .unwrap();
        }
        for (origin, target) in edges {
            builder
                .add_dependency(DependencySpec::new(
                    format!("app.{origin}.Type"),
                    format!("app.{target}.Type"),
                    format!("{origin} calls {target}"),
                ))
                .unwrap();
        }
        builder.build()
    }

    fn cycle_paths(graph: &Graph, max: usize) -> (Vec<String>, bool) {
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();
        let dependencies = ComponentDependencies::derive(&components, graph.dependencies());
        let search = find_cycles(&components, &dependencies, max);
        (
            search.cycles.iter().map(Cycle::path).collect(),
            search.limit_reached,
        )
    }

    #[test]
    fn two_component_cycle() {
        let graph = sliced_graph(&[("a", "b"), ("b", "a")]);
        let (paths, _) = cycle_paths(&graph, 100);
        assert_eq!(paths, vec!["Slice a -> Slice b -> Slice a"]);
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let graph = sliced_graph(&[("a", "b"), ("b", "c"), ("a", "c")]);
        assert!(cycle_paths(&graph, 100).0.is_empty());
    }

    #[test]
    fn every_elementary_cycle_is_rooted_at_its_smallest_member() {
        // a <-> b, b <-> c, a -> c -> a
        let graph = sliced_graph(&[
            ("a", "b"),
            ("b", "a"),
            ("b", "c"),
            ("c", "b"),
            ("c", "a"),
        ]);
        let (paths, limited) = cycle_paths(&graph, 100);
        assert!(!limited);
        assert_eq!(
            paths,
            vec![
                "Slice a -> Slice b -> Slice a",
                "Slice a -> Slice b -> Slice c -> Slice a",
                "Slice b -> Slice c -> Slice b",
            ]
        );
    }

    #[test]
    fn separate_sccs_are_reported_separately() {
        let graph = sliced_graph(&[("a", "b"), ("b", "a"), ("x", "y"), ("y", "x"), ("b", "x")]);
        let (paths, _) = cycle_paths(&graph, 100);
        assert_eq!(
            paths,
            vec!["Slice a -> Slice b -> Slice a", "Slice x -> Slice y -> Slice x"]
        );
    }

    #[test]
    fn limit_bounds_further_cycles_of_an_scc() {
        // a <-> b, b <-> c, a -> c -> a: three cycles in one SCC
        let graph = sliced_graph(&[
            ("a", "b"),
            ("b", "a"),
            ("b", "c"),
            ("c", "b"),
            ("c", "a"),
        ]);
        let (paths, limited) = cycle_paths(&graph, 1);
        assert_eq!(paths, vec!["Slice a -> Slice b -> Slice a"]);
        assert!(limited);

        let single = sliced_graph(&[("a", "b"), ("b", "a")]);
        let (paths, limited) = cycle_paths(&single, 1);
        assert_eq!(paths.len(), 1);
        assert!(!limited);
    }

    #[test]
    fn every_cyclic_scc_reports_a_cycle_despite_the_limit() {
        let graph = sliced_graph(&[("a", "b"), ("b", "a"), ("x", "y"), ("y", "x")]);
        let (paths, limited) = cycle_paths(&graph, 1);
        assert_eq!(
            paths,
            vec!["Slice a -> Slice b -> Slice a", "Slice x -> Slice y -> Slice x"]
        );
        assert!(!limited);

        let (paths, _) = cycle_paths(&graph, 0);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn dead_ends_are_not_walked_again() {
        // a <-> b, then b -> d00 -> {l00, r00} -> d01 ... -> c -> b: every
        // diamond path from a runs into b on the current path
        let diamonds = 40;
        let mut edges: Vec<(String, String)> = [("a", "b"), ("b", "a"), ("b", "d00")]
            .into_iter()
            .map(|(o, t)| (o.to_string(), t.to_string()))
            .collect();
        for index in 0..diamonds {
            let (entry, exit) = (format!("d{index:02}"), format!("d{:02}", index + 1));
            for side in [format!("l{index:02}"), format!("r{index:02}")] {
                edges.push((entry.clone(), side.clone()));
                edges.push((side, exit.clone()));
            }
        }
        edges.push((format!("d{diamonds:02}"), "c".to_string()));
        edges.push(("c".to_string(), "b".to_string()));

        let pairs: Vec<(&str, &str)> = edges
            .iter()
            .map(|(o, t)| (o.as_str(), t.as_str()))
            .collect();
        let graph = sliced_graph(&pairs);
        let (paths, limited) = cycle_paths(&graph, 3);
        assert_eq!(paths.len(), 3);
        assert!(limited);
        assert_eq!(paths[0], "Slice a -> Slice b -> Slice a");
        assert!(
            paths[1].starts_with("Slice b -> Slice d00 -> Slice l00 -> Slice d01"),
            "{}",
            paths[1]
        );
    }

    #[test]
    fn report_lists_evidence_per_hop_and_omits_overflow() {
        let mut builder = Graph::builder();
        for name in ["app.a.A", "app.b.B"] {
            builder.add_element(ElementSpec::class(name)).unwrap();
        }
        for text in ["ab1", "ab2", "ab3"] {
            builder
                .add_dependency(DependencySpec::new("app.a.A", "app.b.B", text).at("A.java", 1))
                .unwrap();
        }
        builder
            .add_dependency(DependencySpec::new("app.b.B", "app.a.A", "ba"))
            .unwrap();
        let graph = builder.build();

        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();
        let dependencies = ComponentDependencies::derive(&components, graph.dependencies());
        let search = find_cycles(&components, &dependencies, 10);

        insta::assert_snapshot!(search.cycles[0].report(2), @r"
        Cycle detected: Slice a ->
                        Slice b ->
                        Slice a
          1. Dependencies of Slice a
            - ab1 in (A.java:1)
            - ab2 in (A.java:1)
            (1 further dependencies have been omitted...)
          2. Dependencies of Slice b
            - ba
        ");
    }

    #[test]
    fn condition_respects_its_ignore_filter() {
        let graph = sliced_graph(&[("a", "b"), ("b", "a")]);
        let config = Config::default();
        let ctx = EvaluationContext::new(&graph, &config);
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();

        let mut events = ConditionEvents::new();
        be_free_of_cycles().check(&components, &ctx, &mut events).unwrap();
        assert_eq!(events.violating().len(), 1);

        let mut events = ConditionEvents::new();
        be_free_of_cycles()
            .ignore_dependency_between("app.b.Type", "app.a.Type")
            .check(&components, &ctx, &mut events)
            .unwrap();
        assert!(!events.contain_violation());
    }

    #[test]
    fn condition_records_information_when_limit_is_hit() {
        let graph = sliced_graph(&[
            ("a", "b"),
            ("b", "a"),
            ("b", "c"),
            ("c", "b"),
            ("c", "a"),
        ]);
        let mut config = Config::default();
        config.cycles.max_number_to_detect = 1;
        let ctx = EvaluationContext::new(&graph, &config);
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();

        let mut events = ConditionEvents::new();
        be_free_of_cycles().check(&components, &ctx, &mut events).unwrap();
        assert_eq!(events.violating().len(), 1);
        assert!(events.information().unwrap().contains("configured limit (1)"));
    }

    #[test]
    fn zero_limit_still_violates() {
        let graph = sliced_graph(&[("a", "b"), ("b", "a")]);
        let mut config = Config::default();
        config.cycles.max_number_to_detect = 0;
        let ctx = EvaluationContext::new(&graph, &config);
        let slices = SliceAssignment::matching("app.(*)..").unwrap();
        let components =
            Components::partition(graph.elements().iter().map(AsRef::as_ref), &slices).unwrap();

        let mut events = ConditionEvents::new();
        be_free_of_cycles().check(&components, &ctx, &mut events).unwrap();
        assert!(events.contain_violation());
        assert_eq!(events.violating().len(), 1);
    }
}
