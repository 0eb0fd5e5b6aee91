//! Pure domain model for declarative architecture rules.
//!
//! No serde and no I/O here. Every pattern is compiled and every name is
//! validated at construction, so building rules from a
//! [`DeclarativeConfig`] cannot fail.

use crate::component::SliceAssignment;
use crate::error::ConfigurationError;
use crate::modules::{DependencyScope, ModuleDefinition, ModuleDefinitions};
use crate::namespace::NamespaceMatcher;
use crate::predicate::{DependencyPredicate, ElementPredicate};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated module name: non-empty, no arrows, braces or commas.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleName(String);

impl ModuleName {
    /// Creates a module name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or would not survive an
    /// allowed-dependencies declaration line.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyModuleName);
        }
        if name.contains("->") || name.contains(['{', '}', ',', '#']) {
            return Err(ModelError::InvalidModuleName {
                name: name.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ────────────────────────────────────────────
// Domain entities
// ────────────────────────────────────────────

/// A module and the namespaces it spans.
#[derive(Debug, Clone)]
pub struct ModuleDecl {
    name: ModuleName,
    namespaces: Vec<NamespaceMatcher>,
}

impl ModuleDecl {
    /// Creates a module declaration.
    ///
    /// # Errors
    ///
    /// Returns error if no namespace is given.
    pub fn new(name: ModuleName, namespaces: Vec<NamespaceMatcher>) -> Result<Self, ModelError> {
        if namespaces.is_empty() {
            return Err(ModelError::EmptyNamespaces {
                module: name.to_string(),
            });
        }
        Ok(Self { name, namespaces })
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    /// Returns the namespace patterns.
    #[must_use]
    pub fn namespaces(&self) -> &[NamespaceMatcher] {
        &self.namespaces
    }

    fn definition(&self) -> ModuleDefinition {
        let matchers = self.namespaces.clone();
        let listed: Vec<String> = matchers.iter().map(ToString::to_string).collect();
        ModuleDefinition::new(
            self.name.as_str(),
            ElementPredicate::new(
                format!("reside in any namespace [{}]", listed.join(", ")),
                move |element| matchers.iter().any(|m| m.matches(element.namespace())),
            ),
        )
    }
}

/// Which module rules to generate.
#[derive(Debug, Clone, Default)]
pub struct ModuleRules {
    /// Check `[allowed-dependencies]`.
    pub respect_allowed_dependencies: bool,
    /// Check modules for cycles.
    pub free_of_cycles: bool,
    /// Module-to-module dependencies must target this namespace.
    pub only_through: Option<NamespaceMatcher>,
    /// Which raw dependencies the allow-list check considers.
    pub scope: DependencyScope,
}

/// A slice pattern and the rules generated for it.
#[derive(Debug, Clone)]
pub struct SliceDecl {
    id: String,
    assignment: SliceAssignment,
    free_of_cycles: bool,
    independent: bool,
}

impl SliceDecl {
    /// Creates a slice declaration.
    #[must_use]
    pub fn new(
        id: String,
        assignment: SliceAssignment,
        free_of_cycles: bool,
        independent: bool,
    ) -> Self {
        Self {
            id,
            assignment,
            free_of_cycles,
            independent,
        }
    }

    /// Prefix of the generated rule names.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The slice assignment.
    #[must_use]
    pub fn assignment(&self) -> &SliceAssignment {
        &self.assignment
    }

    /// Whether to check the slices for cycles.
    #[must_use]
    pub fn free_of_cycles(&self) -> bool {
        self.free_of_cycles
    }

    /// Whether slices may not depend on each other at all.
    #[must_use]
    pub fn independent(&self) -> bool {
        self.independent
    }
}

// ────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────

/// Validated declarative configuration.
///
/// Cross-references (module names in the allow-list) are verified at
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct DeclarativeConfig {
    modules: Vec<ModuleDecl>,
    allowed: BTreeMap<ModuleName, BTreeSet<ModuleName>>,
    module_rules: Option<ModuleRules>,
    slices: Vec<SliceDecl>,
    ignored: Vec<DependencyPredicate>,
}

impl DeclarativeConfig {
    /// Creates a declarative config with full validation.
    ///
    /// # Errors
    ///
    /// Returns every duplicate module name and every allow-list entry that
    /// names an undeclared module.
    pub fn new(
        modules: Vec<ModuleDecl>,
        allowed: BTreeMap<ModuleName, BTreeSet<ModuleName>>,
        module_rules: Option<ModuleRules>,
        slices: Vec<SliceDecl>,
        ignored: Vec<DependencyPredicate>,
    ) -> Result<Self, Vec<ModelError>> {
        let mut errors = Vec::new();
        let mut declared = BTreeSet::new();

        for module in &modules {
            if !declared.insert(module.name.clone()) {
                errors.push(ModelError::DuplicateModule {
                    name: module.name.to_string(),
                });
            }
        }

        for (origin, targets) in &allowed {
            if !declared.contains(origin) {
                errors.push(ModelError::UnknownModule {
                    context: "allowed-dependencies".to_string(),
                    name: origin.to_string(),
                });
            }
            for target in targets.iter().filter(|t| !declared.contains(*t)) {
                errors.push(ModelError::UnknownModule {
                    context: format!("allowed-dependencies.{origin}"),
                    name: target.to_string(),
                });
            }
        }

        if module_rules.is_some() && modules.is_empty() {
            errors.push(ModelError::RulesWithoutModules);
        }

        if errors.is_empty() {
            Ok(Self {
                modules,
                allowed,
                module_rules,
                slices,
                ignored,
            })
        } else {
            Err(errors)
        }
    }

    /// Returns true if no rule would be generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.module_rules.is_none() && self.slices.is_empty()
    }

    /// Declared modules.
    #[must_use]
    pub fn modules(&self) -> &[ModuleDecl] {
        &self.modules
    }

    /// Allowed targets per module.
    #[must_use]
    pub fn allowed(&self) -> &BTreeMap<ModuleName, BTreeSet<ModuleName>> {
        &self.allowed
    }

    /// Module rule switches, if `[module-rules]` is present.
    #[must_use]
    pub fn module_rules(&self) -> Option<&ModuleRules> {
        self.module_rules.as_ref()
    }

    /// Slice declarations.
    #[must_use]
    pub fn slices(&self) -> &[SliceDecl] {
        &self.slices
    }

    /// Dependencies every generated rule ignores.
    #[must_use]
    pub fn ignored(&self) -> &[DependencyPredicate] {
        &self.ignored
    }

    /// The declared modules as a classifier.
    #[must_use]
    pub fn module_definitions(&self) -> ModuleDefinitions {
        self.modules
            .iter()
            .fold(ModuleDefinitions::new(), |definitions, module| {
                definitions.define(module.definition())
            })
    }
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Domain validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Module name is empty.
    #[error("module name must not be empty")]
    EmptyModuleName,

    /// Module name contains reserved characters.
    #[error("invalid module name `{name}`: `->`, braces, commas and `#` are reserved")]
    InvalidModuleName {
        /// The invalid name.
        name: String,
    },

    /// A module declares no namespace.
    #[error("module `{module}` declares no namespaces")]
    EmptyNamespaces {
        /// The module.
        module: String,
    },

    /// A pattern or glob does not compile.
    #[error(transparent)]
    Pattern(#[from] ConfigurationError),

    /// Two modules share a name.
    #[error("duplicate module `{name}`")]
    DuplicateModule {
        /// The repeated name.
        name: String,
    },

    /// A reference to an undeclared module.
    #[error("{context}: unknown module `{name}`")]
    UnknownModule {
        /// Where the reference occurred.
        context: String,
        /// The unresolved name.
        name: String,
    },

    /// `[module-rules]` without any `[[modules]]`.
    #[error("[module-rules] is set but no [[modules]] are declared")]
    RulesWithoutModules,
}
