//! # archrule-core
//!
//! Architecture rule evaluation over an imported dependency graph.
//!
//! An importer (outside this crate) turns compiled code into a [`Graph`]
//! of code elements and dependencies. Rules select subjects from the
//! graph, check a condition on each of them, and report every violation
//! with the evidence that caused it:
//!
//! ```text
//! GraphSnapshot ──► Graph
//!                     │
//!   ElementRule   ────┤  elements  ──► Condition<CodeElement> ─┐
//!   ComponentRule ────┤  slices / modules ──► Condition<Components>
//!   LayeredArchitecture                                        │
//!                                                              ▼
//!                          ConditionEvents ──► EvaluationResult ──► report
//! ```
//!
//! - [`ArchRule`] is the evaluable rule; [`ElementRule`] and
//!   [`ComponentRule`] are built fluently.
//! - [`condition`] holds the event model and element conditions.
//! - [`component`] carves slices and aggregates dependencies between them.
//! - [`modules`] adds declared modules, allow-lists and layers.
//! - [`declarative`] builds rules from TOML.
//!
//! ## Example
//!
//! ```ignore
//! use archrule_core::{be_free_of_cycles, ArchRule, ComponentRule, GraphSnapshot, SliceAssignment};
//!
//! let snapshot: GraphSnapshot = serde_json::from_str(&json)?;
//! let graph = snapshot.into_graph()?;
//! ComponentRule::slices(SliceAssignment::matching("app.(*)..")?)
//!     .should(be_free_of_cycles())
//!     .check(&graph)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod cycle;
mod error;
mod graph;
mod namespace;
mod result;
mod rule;
mod snapshot;
mod transitive;

pub mod component;
pub mod condition;
pub mod declarative;
pub mod modules;
pub mod predicate;

pub use component::{Classifier, Component, Components, IgnoreDependencies, SliceAssignment};
pub use condition::{
    BoxedCondition, Condition, ConditionEvent, ConditionEvents, ConditionExt, Describe,
};
pub use config::{Config, ConfigError, CycleConfig, RuleConfig, TransitiveConfig};
pub use context::EvaluationContext;
pub use cycle::{be_free_of_cycles, find_cycles, BeFreeOfCycles, Cycle, CycleSearch};
pub use error::{ConfigurationError, GraphError};
pub use graph::{
    CodeElement, Dependency, DependencyKind, DependencySpec, ElementId, ElementKind, ElementSpec,
    Graph, GraphBuilder, SourceLocation, Visibility,
};
pub use modules::{LayeredArchitecture, ModuleDefinition, ModuleDefinitions};
pub use namespace::NamespaceMatcher;
pub use predicate::{DependencyPredicate, DescribedPredicate, ElementPredicate};
pub use result::{ArchitectureViolation, EvaluationResult, Priority, RuleError};
pub use rule::{
    ArchRule, ComponentRule, ComponentSelection, ElementRule, ElementSelection, RuleBox,
};
pub use snapshot::{DependencyRecord, ElementRecord, GraphSnapshot};
pub use transitive::{
    transitively_depend_on_elements_that, TransitiveDependencyFinder, TransitivelyDependOn,
};
