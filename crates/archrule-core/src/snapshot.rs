//! Serializable form of a [`Graph`].
//!
//! The importer that reads compiled code is an external collaborator; it
//! hands the engine a snapshot in this shape (typically as JSON). Elements
//! are referenced by fully qualified name.

use crate::error::GraphError;
use crate::graph::{
    DependencyKind, DependencySpec, ElementKind, ElementSpec, Graph, SourceLocation, Visibility,
};
use serde::{Deserialize, Serialize};

/// Snapshot of a dependency graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Elements of the program.
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    /// Dependencies between them.
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

/// One element of a [`GraphSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Fully qualified name.
    pub name: String,
    /// Namespace; derived from `name` when omitted.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Element kind.
    #[serde(default)]
    pub kind: ElementKind,
    /// Visibility.
    #[serde(default)]
    pub visibility: Visibility,
}

/// One dependency of a [`GraphSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Name of the depending element.
    pub origin: String,
    /// Name of the element depended upon.
    pub target: String,
    /// Dependency kind.
    #[serde(default)]
    pub kind: DependencyKind,
    /// Evidence text.
    pub description: String,
    /// Where the dependency was observed.
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl GraphSnapshot {
    /// Builds the indexed graph.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] for duplicate names or dangling references.
    pub fn into_graph(self) -> Result<Graph, GraphError> {
        let mut builder = Graph::builder();
        for record in self.elements {
            let spec = match record.namespace {
                Some(namespace) => ElementSpec::new(record.name, namespace),
                None => ElementSpec::class(record.name),
            };
            builder.add_element(spec.kind(record.kind).visibility(record.visibility))?;
        }
        for record in self.dependencies {
            builder.add_dependency(
                DependencySpec::new(record.origin, record.target, record.description)
                    .kind(record.kind)
                    .location(record.location),
            )?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_snapshot_builds_graph() {
        let json = r#"{
            "elements": [
                { "name": "app.one.A" },
                { "name": "app.two.B", "kind": "interface", "visibility": "package" },
                { "name": "app.two.B.run()", "namespace": "app.two", "kind": "method" }
            ],
            "dependencies": [
                {
                    "origin": "app.one.A",
                    "target": "app.two.B.run()",
                    "kind": "method-call",
                    "description": "Method <app.one.A.go()> calls method <app.two.B.run()>",
                    "location": { "file": "A.java", "line": 7 }
                }
            ]
        }"#;
        let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();
        let graph = snapshot.into_graph().unwrap();

        assert_eq!(graph.len(), 3);
        let b = graph.find("app.two.B").unwrap();
        assert_eq!(b.kind(), ElementKind::Interface);
        assert_eq!(b.visibility(), Visibility::Package);
        assert_eq!(graph.find("app.two.B.run()").unwrap().namespace(), "app.two");

        let a = graph.find("app.one.A").unwrap();
        let deps = graph.dependencies_from(a);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].kind(), DependencyKind::MethodCall);
        assert_eq!(
            deps[0].description_line(),
            "Method <app.one.A.go()> calls method <app.two.B.run()> in (A.java:7)"
        );
    }

    #[test]
    fn dangling_reference_fails() {
        let snapshot = GraphSnapshot {
            elements: vec![],
            dependencies: vec![DependencyRecord {
                origin: "x.X".into(),
                target: "y.Y".into(),
                kind: DependencyKind::Other,
                description: "x".into(),
                location: None,
            }],
        };
        assert!(snapshot.into_graph().is_err());
    }
}
