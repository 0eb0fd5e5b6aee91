//! Policies deciding which module may depend on which.

use crate::component::{Component, Components};
use crate::error::ConfigurationError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Decides whether one module may depend on another.
pub trait DependencyPolicy: Send + Sync {
    /// Description used in rule text.
    fn description(&self) -> String;

    /// Checks the policy against the evaluated components once, before any
    /// dependency is judged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownComponent`] if the policy names
    /// a module that is not declared.
    fn validate(&self, _components: &Components) -> Result<(), ConfigurationError> {
        Ok(())
    }

    /// Returns true if `origin` may depend on `target`.
    fn allows(&self, origin: &Component, target: &Component) -> bool;
}

/// An explicit allow-list `origin -> {targets}`.
///
/// Declaration order does not matter; repeated origins accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedModuleDependencies {
    allowed: BTreeMap<String, BTreeSet<String>>,
}

impl AllowedModuleDependencies {
    /// Nothing allowed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows `origin` to depend on each of `targets`.
    #[must_use]
    pub fn allow<I, S>(mut self, origin: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .entry(origin.into())
            .or_default()
            .extend(targets.into_iter().map(Into::into));
        self
    }

    /// Allowed targets per origin.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.allowed.iter().map(|(origin, targets)| (origin.as_str(), targets))
    }
}

impl fmt::Display for AllowedModuleDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .allowed
            .iter()
            .map(|(origin, targets)| {
                let targets: Vec<&str> = targets.iter().map(String::as_str).collect();
                format!("{origin} -> [{}]", targets.join(", "))
            })
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

impl DependencyPolicy for AllowedModuleDependencies {
    fn description(&self) -> String {
        self.to_string()
    }

    fn validate(&self, components: &Components) -> Result<(), ConfigurationError> {
        let names = self
            .allowed
            .iter()
            .flat_map(|(origin, targets)| std::iter::once(origin).chain(targets));
        for name in names {
            if !components.is_known_name(name) {
                return Err(ConfigurationError::UnknownComponent {
                    context: "allowed module dependencies".to_string(),
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn allows(&self, origin: &Component, target: &Component) -> bool {
        self.allowed
            .get(origin.name())
            .is_some_and(|targets| targets.contains(target.name()))
    }
}

impl FromStr for AllowedModuleDependencies {
    type Err = ConfigurationError;

    /// Parses one declaration per line: `One -> Two, Three` or
    /// `One -> {Two, Three}`. Blank lines and `#` comments are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parsed = Self::new();
        for line in s.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let invalid = |reason: &str| ConfigurationError::InvalidAllowedDependencies {
                line: line.to_string(),
                reason: reason.to_string(),
            };

            let (origin, targets) = line.split_once("->").ok_or_else(|| invalid("missing `->`"))?;
            let origin = origin.trim();
            if origin.is_empty() {
                return Err(invalid("missing origin module"));
            }

            let targets = targets.trim();
            let targets = match (targets.strip_prefix('{'), targets.ends_with('}')) {
                (Some(inner), true) => inner.strip_suffix('}').unwrap_or(inner),
                (None, false) => targets,
                _ => return Err(invalid("unbalanced braces")),
            };
            let names: Vec<&str> = targets
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect();
            if names.iter().any(|name| name.contains("->") || name.contains(['{', '}'])) {
                return Err(invalid("malformed target list"));
            }
            parsed = parsed.allow(origin, names);
        }
        Ok(parsed)
    }
}

/// A policy given by a closure over module pairs.
#[derive(Clone)]
pub struct AllowedBy {
    description: String,
    allows: Arc<dyn Fn(&Component, &Component) -> bool + Send + Sync>,
}

/// A policy allowing exactly the pairs `allows` accepts.
#[must_use]
pub fn allowed_by(
    description: impl Into<String>,
    allows: impl Fn(&Component, &Component) -> bool + Send + Sync + 'static,
) -> AllowedBy {
    AllowedBy {
        description: description.into(),
        allows: Arc::new(allows),
    }
}

impl fmt::Debug for AllowedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllowedBy")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl DependencyPolicy for AllowedBy {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn allows(&self, origin: &Component, target: &Component) -> bool {
        (self.allows)(origin, target)
    }
}
