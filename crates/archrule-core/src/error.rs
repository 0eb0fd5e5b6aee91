//! Errors that abort a single rule evaluation.
//!
//! A violated rule is not an error: violations are data carried in
//! [`ConditionEvents`](crate::ConditionEvents). The types here describe rules
//! that cannot be evaluated at all, and graphs that cannot be built.

/// A rule references something it cannot evaluate.
///
/// Fatal for the rule evaluation that raised it; never turned into an
/// empty result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A namespace pattern (e.g. `app.(*)..`) is ill-formed.
    #[error("invalid namespace pattern `{pattern}`: {reason}")]
    InvalidNamespacePattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A regular expression given to a predicate or condition does not compile.
    #[error("invalid regular expression `{pattern}`: {message}")]
    InvalidRegex {
        /// The offending expression.
        pattern: String,
        /// Message reported by the regex engine.
        message: String,
    },

    /// A glob over element names does not compile.
    #[error("invalid glob `{pattern}`: {message}")]
    InvalidGlob {
        /// The offending glob.
        pattern: String,
        /// Message reported by the glob parser.
        message: String,
    },

    /// An element is claimed by more than one component definition.
    #[error(
        "element `{element}` is contained in more than one component: {}",
        candidates.join(", ")
    )]
    AmbiguousComponent {
        /// Name of the element.
        element: String,
        /// Names of all components that claim it.
        candidates: Vec<String>,
    },

    /// A policy refers to a component name that is not declared.
    #[error("{context}: unknown component `{name}`")]
    UnknownComponent {
        /// Where the name was referenced (e.g. "allowed dependencies").
        context: String,
        /// The unresolved name.
        name: String,
    },

    /// An allowed-dependencies declaration line cannot be parsed.
    #[error("invalid allowed dependency declaration `{line}`: {reason}")]
    InvalidAllowedDependencies {
        /// The offending line.
        line: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The rule's subject selection matched nothing.
    #[error(
        "Rule '{rule}' failed to check any elements. This means either that no elements have been \
         passed to the rule at all, or that no elements passed to the rule matched the selection. \
         Use `allow_empty_should(true)` on the rule or set `fail_on_empty_should = false` to allow this"
    )]
    EmptyShould {
        /// Description of the rule.
        rule: String,
    },
}

impl ConfigurationError {
    pub(crate) fn invalid_regex(pattern: &str, err: &regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors raised while assembling a [`Graph`](crate::Graph).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two elements share the same name.
    #[error("duplicate element `{name}`")]
    DuplicateElement {
        /// The repeated name.
        name: String,
    },

    /// A dependency refers to an element that was never added.
    #[error("{context}: unknown element `{name}`")]
    UnknownElement {
        /// Which dependency referenced it.
        context: String,
        /// The unresolved name.
        name: String,
    },
}
