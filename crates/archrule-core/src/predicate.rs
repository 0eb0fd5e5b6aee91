//! Predicates that carry their own human-readable description.
//!
//! Violation text is generated from these descriptions, so combining two
//! predicates also combines their descriptions: `a.and(b)` reads
//! `"<a> and <b>"`.

use crate::error::ConfigurationError;
use crate::graph::{CodeElement, Dependency};
use std::fmt;
use std::sync::Arc;

/// A boolean function paired with a description.
pub struct DescribedPredicate<T: ?Sized> {
    description: String,
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

/// Predicate over elements.
pub type ElementPredicate = DescribedPredicate<CodeElement>;

/// Predicate over raw dependencies.
pub type DependencyPredicate = DescribedPredicate<Dependency>;

impl<T: ?Sized + 'static> DescribedPredicate<T> {
    /// Creates a predicate.
    pub fn new(
        description: impl Into<String>,
        test: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    /// The description used in rule and violation text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluates the predicate.
    pub fn test(&self, item: &T) -> bool {
        (self.test)(item)
    }

    /// Both predicates hold.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let description = format!("{} and {}", self.description, other.description);
        let (left, right) = (self.test, other.test);
        Self {
            description,
            test: Arc::new(move |item: &T| left(item) && right(item)),
        }
    }

    /// Either predicate holds.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let description = format!("{} or {}", self.description, other.description);
        let (left, right) = (self.test, other.test);
        Self {
            description,
            test: Arc::new(move |item: &T| left(item) || right(item)),
        }
    }

    /// The predicate does not hold.
    #[must_use]
    pub fn negate(self) -> Self {
        let description = format!("not {}", self.description);
        let inner = self.test;
        Self {
            description,
            test: Arc::new(move |item: &T| !inner(item)),
        }
    }

    /// Replaces the description, keeping the behavior.
    #[must_use]
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<T: ?Sized> Clone for DescribedPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: ?Sized> fmt::Debug for DescribedPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescribedPredicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> fmt::Display for DescribedPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Predicates over [`CodeElement`]s.
///
/// Descriptions are phrased to follow "elements that ...".
pub mod elements {
    use super::{ConfigurationError, ElementPredicate};
    use crate::graph::{ElementKind, Visibility};
    use crate::namespace::NamespaceMatcher;
    use regex::Regex;

    /// Matches every element.
    #[must_use]
    pub fn any() -> ElementPredicate {
        ElementPredicate::new("are any element", |_| true)
    }

    /// Fully qualified name equals `name`.
    #[must_use]
    pub fn name_equal_to(name: &str) -> ElementPredicate {
        let expected = name.to_string();
        ElementPredicate::new(format!("have name '{name}'"), move |element| {
            element.name() == expected
        })
    }

    /// Fully qualified name matches `pattern` in full.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidRegex`] if `pattern` does not compile.
    pub fn name_matching(pattern: &str) -> Result<ElementPredicate, ConfigurationError> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|err| ConfigurationError::invalid_regex(pattern, &err))?;
        Ok(ElementPredicate::new(
            format!("have name matching '{pattern}'"),
            move |element| regex.is_match(element.name()),
        ))
    }

    /// Namespace matches a [`NamespaceMatcher`] pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad pattern.
    pub fn resides_in(pattern: &str) -> Result<ElementPredicate, ConfigurationError> {
        let matcher = NamespaceMatcher::new(pattern)?;
        Ok(ElementPredicate::new(
            format!("reside in a namespace '{pattern}'"),
            move |element| matcher.matches(element.namespace()),
        ))
    }

    /// Namespace matches any of the patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] for a bad pattern.
    pub fn resides_in_any<S: AsRef<str>>(
        patterns: &[S],
    ) -> Result<ElementPredicate, ConfigurationError> {
        let matchers = patterns
            .iter()
            .map(|pattern| NamespaceMatcher::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let listed = matchers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(ElementPredicate::new(
            format!("reside in any namespace [{listed}]"),
            move |element| matchers.iter().any(|m| m.matches(element.namespace())),
        ))
    }

    /// Element is of `kind`.
    #[must_use]
    pub fn has_kind(kind: ElementKind) -> ElementPredicate {
        ElementPredicate::new(format!("are of kind {kind}"), move |element| {
            element.kind() == kind
        })
    }

    /// Element has `visibility`.
    #[must_use]
    pub fn has_visibility(visibility: Visibility) -> ElementPredicate {
        ElementPredicate::new(format!("are {visibility}"), move |element| {
            element.visibility() == visibility
        })
    }
}

/// Predicates over raw [`Dependency`](crate::Dependency) edges.
pub mod dependencies {
    use super::{ConfigurationError, DependencyPredicate, ElementPredicate};
    use crate::graph::DependencyKind;

    /// The origin element satisfies `predicate`.
    #[must_use]
    pub fn origin(predicate: ElementPredicate) -> DependencyPredicate {
        DependencyPredicate::new(format!("origin {predicate}"), move |dependency| {
            predicate.test(dependency.origin())
        })
    }

    /// The target element satisfies `predicate`.
    #[must_use]
    pub fn target(predicate: ElementPredicate) -> DependencyPredicate {
        DependencyPredicate::new(format!("target {predicate}"), move |dependency| {
            predicate.test(dependency.target())
        })
    }

    /// Origin and target satisfy their respective predicates.
    #[must_use]
    pub fn between_elements(
        origin: ElementPredicate,
        target: ElementPredicate,
    ) -> DependencyPredicate {
        DependencyPredicate::new(
            format!("origin {origin} and target {target}"),
            move |dependency| origin.test(dependency.origin()) && target.test(dependency.target()),
        )
    }

    /// Origin and target have exactly these names.
    #[must_use]
    pub fn between(origin: &str, target: &str) -> DependencyPredicate {
        let (expected_origin, expected_target) = (origin.to_string(), target.to_string());
        DependencyPredicate::new(
            format!("dependency <{origin}> -> <{target}>"),
            move |dependency| {
                dependency.origin().name() == expected_origin
                    && dependency.target().name() == expected_target
            },
        )
    }

    /// Origin and target names match the globs (`*` spans dots).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidGlob`] if a glob does not compile.
    pub fn between_matching(
        origin: &str,
        target: &str,
    ) -> Result<DependencyPredicate, ConfigurationError> {
        let compile = |pattern: &str| {
            glob::Pattern::new(pattern).map_err(|err| ConfigurationError::InvalidGlob {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })
        };
        let (origin_glob, target_glob) = (compile(origin)?, compile(target)?);
        Ok(DependencyPredicate::new(
            format!("dependency <{origin}> -> <{target}>"),
            move |dependency| {
                origin_glob.matches(dependency.origin().name())
                    && target_glob.matches(dependency.target().name())
            },
        ))
    }

    /// The dependency is of `kind`.
    #[must_use]
    pub fn of_kind(kind: DependencyKind) -> DependencyPredicate {
        DependencyPredicate::new(format!("of kind {kind:?}"), move |dependency| {
            dependency.kind() == kind
        })
    }
}
