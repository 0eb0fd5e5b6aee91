//! Immutable dependency graph the rules are evaluated against.
//!
//! A [`Graph`] is a read-only snapshot of code elements and the directed,
//! evidenced dependencies between them. It is assembled once through a
//! [`GraphBuilder`] (or from a [`GraphSnapshot`](crate::GraphSnapshot)) and
//! never mutated afterwards, so any number of rules may evaluate it
//! concurrently behind an `Arc`.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Opaque identifier of an element within one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

impl ElementId {
    /// Position of the element in [`Graph::elements`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What sort of code element this is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A class or struct-like type.
    #[default]
    Class,
    /// An interface or trait.
    Interface,
    /// An enumeration.
    Enum,
    /// A method or function.
    Method,
    /// A constructor.
    Constructor,
    /// A field.
    Field,
    /// Anything else the importer emits.
    Other,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::Enum => "Enum",
            Self::Method => "Method",
            Self::Constructor => "Constructor",
            Self::Field => "Field",
            Self::Other => "Element",
        };
        f.write_str(label)
    }
}

/// Declared visibility of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible everywhere.
    #[default]
    Public,
    /// Visible to subtypes.
    Protected,
    /// Visible inside the containing namespace.
    Package,
    /// Visible inside the element's owner only.
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Package => write!(f, "package-private"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// A single analyzable unit of the subject program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeElement {
    id: ElementId,
    name: String,
    namespace: String,
    kind: ElementKind,
    visibility: Visibility,
}

impl CodeElement {
    /// Identifier within the owning graph.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Fully qualified name, e.g. `app.one.Service`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the namespace prefix.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.name)
    }

    /// Dot-separated namespace (package) the element lives in.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Element kind.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Declared visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl fmt::Display for CodeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.kind, self.name)
    }
}

/// How one element depends on another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// A method invocation.
    MethodCall,
    /// A constructor invocation.
    ConstructorCall,
    /// A field read or write.
    FieldAccess,
    /// The origin extends the target.
    Inheritance,
    /// The origin implements the target.
    Implementation,
    /// The target appears in a signature or local type.
    TypeReference,
    /// The origin is annotated with the target.
    Annotation,
    /// Anything else.
    #[default]
    Other,
}

/// Where a dependency was observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file name.
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
}

impl SourceLocation {
    /// Creates a location.
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A directed, evidenced edge from one element to another.
///
/// Several dependencies may share the same origin and target (one per call
/// site); they are never merged because each is reportable evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    origin: Arc<CodeElement>,
    target: Arc<CodeElement>,
    kind: DependencyKind,
    description: String,
    location: Option<SourceLocation>,
}

impl Dependency {
    /// The depending element.
    #[must_use]
    pub fn origin(&self) -> &Arc<CodeElement> {
        &self.origin
    }

    /// The element depended upon.
    #[must_use]
    pub fn target(&self) -> &Arc<CodeElement> {
        &self.target
    }

    /// Kind of the dependency.
    #[must_use]
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    /// Evidence text, e.g. `Method <A.foo()> calls method <B.bar()>`.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Source location, when the importer recorded one.
    #[must_use]
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Report line: `<evidence> in (<file>:<line>)`.
    #[must_use]
    pub fn description_line(&self) -> String {
        match &self.location {
            Some(location) => format!("{} in ({location})", self.description),
            None => self.description.clone(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description_line())
    }
}

/// Immutable snapshot of elements and dependencies.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    elements: Vec<Arc<CodeElement>>,
    by_name: HashMap<String, ElementId>,
    /// Grouped by origin; insertion order is kept within a group.
    dependencies: Vec<Dependency>,
    outgoing: Vec<Range<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl Graph {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// All elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Arc<CodeElement>] {
        &self.elements
    }

    /// Looks an element up by identifier.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Arc<CodeElement>> {
        self.elements.get(id.0)
    }

    /// Looks an element up by fully qualified name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Arc<CodeElement>> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    /// All dependencies, grouped by origin.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Outgoing dependencies of `element`.
    #[must_use]
    pub fn dependencies_from(&self, element: &CodeElement) -> &[Dependency] {
        self.outgoing
            .get(element.id.0)
            .and_then(|range| self.dependencies.get(range.clone()))
            .unwrap_or_default()
    }

    /// Incoming dependencies of `element`.
    pub fn dependencies_to<'a>(
        &'a self,
        element: &CodeElement,
    ) -> impl Iterator<Item = &'a Dependency> + 'a {
        self.incoming
            .get(element.id.0)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.dependencies.get(index))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the graph has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Description of an element to add to a [`GraphBuilder`].
#[derive(Debug, Clone)]
pub struct ElementSpec {
    name: String,
    namespace: String,
    kind: ElementKind,
    visibility: Visibility,
}

impl ElementSpec {
    /// An element with an explicit namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind: ElementKind::default(),
            visibility: Visibility::default(),
        }
    }

    /// A public class whose namespace is everything before the last `.`.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = name
            .rsplit_once('.')
            .map(|(namespace, _)| namespace.to_string())
            .unwrap_or_default();
        Self::new(name, namespace)
    }

    /// Sets the element kind.
    #[must_use]
    pub fn kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Description of a dependency to add to a [`GraphBuilder`].
#[derive(Debug, Clone)]
pub struct DependencySpec {
    origin: String,
    target: String,
    kind: DependencyKind,
    description: String,
    location: Option<SourceLocation>,
}

impl DependencySpec {
    /// A dependency between two named elements with its evidence text.
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            target: target.into(),
            kind: DependencyKind::default(),
            description: description.into(),
            location: None,
        }
    }

    /// Sets the dependency kind.
    #[must_use]
    pub fn kind(mut self, kind: DependencyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: usize) -> Self {
        self.location = Some(SourceLocation::new(file, line));
        self
    }

    /// Sets or clears the source location.
    #[must_use]
    pub fn location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

/// Assembles a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    elements: Vec<Arc<CodeElement>>,
    by_name: HashMap<String, ElementId>,
    dependencies: Vec<Dependency>,
}

impl GraphBuilder {
    /// Adds an element.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateElement`] if the name is taken.
    pub fn add_element(&mut self, spec: ElementSpec) -> Result<ElementId, GraphError> {
        if self.by_name.contains_key(&spec.name) {
            return Err(GraphError::DuplicateElement { name: spec.name });
        }
        let id = ElementId(self.elements.len());
        self.by_name.insert(spec.name.clone(), id);
        self.elements.push(Arc::new(CodeElement {
            id,
            name: spec.name,
            namespace: spec.namespace,
            kind: spec.kind,
            visibility: spec.visibility,
        }));
        Ok(id)
    }

    /// Adds a dependency between two previously added elements.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownElement`] if either end is missing.
    pub fn add_dependency(&mut self, spec: DependencySpec) -> Result<(), GraphError> {
        let context = format!("dependency `{} -> {}`", spec.origin, spec.target);
        let origin = self.lookup(&spec.origin, &context)?;
        let target = self.lookup(&spec.target, &context)?;
        self.dependencies.push(Dependency {
            origin,
            target,
            kind: spec.kind,
            description: spec.description,
            location: spec.location,
        });
        Ok(())
    }

    fn lookup(&self, name: &str, context: &str) -> Result<Arc<CodeElement>, GraphError> {
        self.by_name
            .get(name)
            .and_then(|id| self.elements.get(id.0))
            .cloned()
            .ok_or_else(|| GraphError::UnknownElement {
                context: context.to_string(),
                name: name.to_string(),
            })
    }

    /// Freezes the builder into an indexed graph.
    #[must_use]
    pub fn build(self) -> Graph {
        let mut dependencies = self.dependencies;
        // stable: call sites keep their order within one origin
        dependencies.sort_by_key(|dependency| dependency.origin.id);

        let mut outgoing = vec![0..0; self.elements.len()];
        let mut incoming = vec![Vec::new(); self.elements.len()];
        let mut start = 0;
        while start < dependencies.len() {
            let origin = dependencies[start].origin.id;
            let end = dependencies[start..]
                .iter()
                .position(|dependency| dependency.origin.id != origin)
                .map_or(dependencies.len(), |offset| start + offset);
            outgoing[origin.0] = start..end;
            start = end;
        }
        for (index, dependency) in dependencies.iter().enumerate() {
            incoming[dependency.target.id.0].push(index);
        }

        Graph {
            elements: self.elements,
            by_name: self.by_name,
            dependencies,
            outgoing,
            incoming,
        }
    }
}
