//! Namespace patterns used to select elements and to carve slices.
//!
//! Syntax, over dot-separated namespaces:
//!
//! | token  | matches                                   |
//! |--------|-------------------------------------------|
//! | `.`    | a literal separator                       |
//! | `..`   | any number of segments, including none    |
//! | `*`    | exactly one segment                       |
//! | `(*)`  | one segment, captured                     |
//! | `(**)` | one or more segments, captured            |
//!
//! `app.(*)..` matches `app.orders` and `app.orders.api`, capturing
//! `orders` in both cases.

use crate::error::ConfigurationError;
use regex::Regex;
use std::fmt;

/// A compiled namespace pattern.
#[derive(Debug, Clone)]
pub struct NamespaceMatcher {
    pattern: String,
    regex: Regex,
}

impl NamespaceMatcher {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidNamespacePattern`] if the
    /// pattern uses anything outside the syntax above.
    pub fn new(pattern: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidNamespacePattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if pattern.contains("...") {
            return Err(invalid("three or more consecutive dots"));
        }

        let mut source = String::from("^");
        let mut rest = pattern;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix("(**)") {
                source.push_str(r"(\w+(?:\.\w+)*)");
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("(*)") {
                source.push_str(r"(\w+)");
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("..") {
                let leading = source.len() == 1;
                let trailing = tail.is_empty();
                source.push_str(match (leading, trailing) {
                    (true, true) => ".*",
                    (true, false) => r"(?:\w+\.)*",
                    (false, true) => r"(?:\.\w+)*",
                    (false, false) => r"\.(?:\w+\.)*",
                });
                rest = tail;
            } else if rest.starts_with("**") {
                return Err(invalid("`**` is only allowed as the capture group `(**)`"));
            } else if let Some(tail) = rest.strip_prefix('*') {
                source.push_str(r"\w+");
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix('.') {
                source.push_str(r"\.");
                rest = tail;
            } else {
                let Some(c) = rest.chars().next() else { break };
                if c == '(' || c == ')' {
                    return Err(invalid("capture groups must be `(*)` or `(**)`"));
                }
                if !(c.is_alphanumeric() || c == '_' || c == '$') {
                    return Err(invalid(&format!("unexpected character `{c}`")));
                }
                source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                rest = &rest[c.len_utf8()..];
            }
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|err| invalid(&err.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if `namespace` matches the whole pattern.
    #[must_use]
    pub fn matches(&self, namespace: &str) -> bool {
        self.regex.is_match(namespace)
    }

    /// Returns the captured groups, or `None` if `namespace` does not match.
    #[must_use]
    pub fn captures(&self, namespace: &str) -> Option<Vec<String>> {
        self.regex.captures(namespace).map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .map(|group| group.as_str().to_string())
                .collect()
        })
    }
}

impl fmt::Display for NamespaceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.pattern)
    }
}
