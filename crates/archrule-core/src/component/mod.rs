//! Grouping elements into named components.
//!
//! ```text
//! elements ──classify──► ComponentKey ──merge by name──► Components
//!                                                          │
//! raw dependencies ──────────────project──────────────────►ComponentDependencies
//! ```
//!
//! Components are rebuilt for every rule evaluation. Identifiers are
//! assigned in name order, so iteration over components (and everything
//! derived from it) is deterministic.

mod dependency;
mod ignore;
mod slices;

pub use dependency::{ComponentDependencies, ComponentDependency, UndefinedDependency};
pub use ignore::{IgnoreDependencies, IgnoreFilter};
pub use slices::SliceAssignment;

use crate::condition::Describe;
use crate::error::ConfigurationError;
use crate::graph::{CodeElement, ElementId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Identifier of a component within one [`Components`] partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(usize);

impl ComponentId {
    /// Position of the component in name order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a classifier assigns an element to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentKey {
    name: String,
    identifier: Vec<String>,
}

impl ComponentKey {
    /// A key with an explicit identifier (e.g. captured namespace segments).
    #[must_use]
    pub fn new(name: impl Into<String>, identifier: Vec<String>) -> Self {
        Self {
            name: name.into(),
            identifier,
        }
    }

    /// A key whose identifier is its name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            identifier: vec![name.clone()],
            name,
        }
    }
}

/// Assigns elements to components.
pub trait Classifier: Send + Sync {
    /// Description used in rule text, e.g. `slices matching 'app.(*)..'`.
    fn description(&self) -> String;

    /// The component `element` belongs to, or `None` if it belongs to none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the element cannot be classified
    /// unambiguously.
    fn classify(&self, element: &CodeElement) -> Result<Option<ComponentKey>, ConfigurationError>;

    /// Component names known up front, if the classifier declares them.
    fn declared_names(&self) -> Option<Vec<String>> {
        None
    }
}

/// A named group of elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    id: ComponentId,
    name: String,
    identifier: Vec<String>,
    members: BTreeSet<ElementId>,
}

impl Component {
    /// Identifier within the partition.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier parts the classifier produced.
    #[must_use]
    pub fn identifier(&self) -> &[String] {
        &self.identifier
    }

    /// Member elements.
    #[must_use]
    pub fn members(&self) -> &BTreeSet<ElementId> {
        &self.members
    }

    /// Returns true if `element` is a member.
    #[must_use]
    pub fn contains(&self, element: &CodeElement) -> bool {
        self.members.contains(&element.id())
    }
}

impl Describe for Component {
    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A partition of elements into components.
#[derive(Debug, Clone, Default)]
pub struct Components {
    components: Vec<Component>,
    membership: HashMap<ElementId, ComponentId>,
    undefined: Vec<ElementId>,
    declared: Option<Vec<String>>,
}

impl Components {
    /// Classifies every element. Keys with the same name merge into one
    /// component; unclassified elements are tracked as undefined.
    ///
    /// # Errors
    ///
    /// Propagates classification errors.
    pub fn partition<'a>(
        elements: impl IntoIterator<Item = &'a CodeElement>,
        classifier: &dyn Classifier,
    ) -> Result<Self, ConfigurationError> {
        let mut grouped: BTreeMap<String, (Vec<String>, BTreeSet<ElementId>)> = BTreeMap::new();
        let mut undefined = Vec::new();

        for element in elements {
            match classifier.classify(element)? {
                Some(key) => {
                    grouped
                        .entry(key.name)
                        .or_insert_with(|| (key.identifier, BTreeSet::new()))
                        .1
                        .insert(element.id());
                }
                None => undefined.push(element.id()),
            }
        }

        let mut membership = HashMap::new();
        let components: Vec<Component> = grouped
            .into_iter()
            .enumerate()
            .map(|(index, (name, (identifier, members)))| {
                let id = ComponentId(index);
                membership.extend(members.iter().map(|member| (*member, id)));
                Component {
                    id,
                    name,
                    identifier,
                    members,
                }
            })
            .collect();

        debug!(
            "Partitioned {} by {}: {} components, {} undefined elements",
            membership.len() + undefined.len(),
            classifier.description(),
            components.len(),
            undefined.len()
        );

        Ok(Self {
            components,
            membership,
            undefined,
            declared: classifier.declared_names(),
        })
    }

    /// Components in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no element was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Looks a component up by identifier.
    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Looks a component up by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Component> {
        self.components
            .binary_search_by(|component| component.name.as_str().cmp(name))
            .ok()
            .and_then(|index| self.components.get(index))
    }

    /// The component `element` belongs to.
    #[must_use]
    pub fn component_of(&self, element: &CodeElement) -> Option<&Component> {
        self.membership
            .get(&element.id())
            .and_then(|id| self.get(*id))
    }

    /// Elements that no component claims.
    #[must_use]
    pub fn undefined(&self) -> &[ElementId] {
        &self.undefined
    }

    /// Returns true if `name` is a known component name: declared by the
    /// classifier, or present in the partition.
    #[must_use]
    pub fn is_known_name(&self, name: &str) -> bool {
        match &self.declared {
            Some(declared) => declared.iter().any(|d| d == name),
            None => self.by_name(name).is_some(),
        }
    }
}

impl Describe for Components {
    fn describe(&self) -> String {
        let names: Vec<&str> = self.components.iter().map(Component::name).collect();
        format!("components [{}]", names.join(", "))
    }
}
