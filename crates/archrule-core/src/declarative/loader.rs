//! DTO → Domain model conversion with validation.

use super::config_dto::{
    DeclarativeConfigDto, IgnoreDependencyDto, ModuleDto, ModuleRulesDto, SliceDto,
};
use super::model::{DeclarativeConfig, ModelError, ModuleDecl, ModuleName, ModuleRules, SliceDecl};
use crate::component::SliceAssignment;
use crate::modules::DependencyScope;
use crate::namespace::NamespaceMatcher;
use crate::predicate::{dependencies, DependencyPredicate};
use std::collections::{BTreeMap, BTreeSet};

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "modules[0].name").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// Unknown `scope` value in `[module-rules]`.
    #[error("{context}: unknown scope `{value}`, expected: all, between-modules")]
    UnknownScope {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Several field-level errors.
    #[error("configuration validation errors:\n{}", format_errors(.0))]
    Fields(Vec<LoadError>),

    /// Cross-reference errors from aggregate root construction.
    #[error("configuration validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<ModelError>),
}

fn format_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn validation(context: impl Into<String>) -> impl FnOnce(ModelError) -> LoadError {
    let context = context.into();
    move |source| LoadError::Validation { context, source }
}

/// Keeps the successes and moves every failure into `errors`.
fn partition<T>(
    results: impl IntoIterator<Item = Result<T, LoadError>>,
    errors: &mut Vec<LoadError>,
) -> Vec<T> {
    let mut converted = Vec::new();
    for result in results {
        match result {
            Ok(value) => converted.push(value),
            Err(err) => errors.push(err),
        }
    }
    converted
}

/// Converts a `DeclarativeConfigDto` to a validated `DeclarativeConfig`.
///
/// Field-level errors are collected across all sections; cross-reference
/// checks run only once every field is valid.
///
/// # Errors
///
/// Returns a single error, [`LoadError::Fields`] for several field-level
/// errors, or [`LoadError::CrossRef`].
pub fn load(dto: DeclarativeConfigDto) -> Result<DeclarativeConfig, LoadError> {
    let mut errors = Vec::new();

    let modules = partition(
        dto.modules.iter().enumerate().map(|(i, m)| convert_module(m, i)),
        &mut errors,
    );
    let allowed = partition(
        dto.allowed_dependencies
            .iter()
            .map(|(origin, targets)| convert_allowed(origin, targets)),
        &mut errors,
    );
    let module_rules = partition(dto.module_rules.as_ref().map(convert_module_rules), &mut errors);
    let slices = partition(
        dto.slices.iter().enumerate().map(|(i, s)| convert_slice(s, i)),
        &mut errors,
    );
    let ignored = partition(
        dto.ignore_dependency
            .iter()
            .enumerate()
            .map(|(i, d)| convert_ignore(d, i)),
        &mut errors,
    );

    match errors.len() {
        0 => {}
        1 => return Err(errors.remove(0)),
        _ => return Err(LoadError::Fields(errors)),
    }

    let allowed: BTreeMap<ModuleName, BTreeSet<ModuleName>> = allowed.into_iter().collect();
    DeclarativeConfig::new(modules, allowed, module_rules.into_iter().next(), slices, ignored)
        .map_err(LoadError::CrossRef)
}

fn convert_module(dto: &ModuleDto, index: usize) -> Result<ModuleDecl, LoadError> {
    let name = ModuleName::new(&dto.name).map_err(validation(format!("modules[{index}].name")))?;
    let namespaces = dto
        .namespaces
        .iter()
        .enumerate()
        .map(|(j, pattern)| {
            NamespaceMatcher::new(pattern)
                .map_err(|e| validation(format!("modules[{index}].namespaces[{j}]"))(e.into()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    ModuleDecl::new(name, namespaces).map_err(validation(format!("modules[{index}]")))
}

fn convert_allowed(
    origin: &str,
    targets: &[String],
) -> Result<(ModuleName, BTreeSet<ModuleName>), LoadError> {
    let context = format!("allowed-dependencies.{origin}");
    let origin = ModuleName::new(origin).map_err(validation(context.clone()))?;
    let targets = targets
        .iter()
        .map(|target| ModuleName::new(target).map_err(validation(context.clone())))
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok((origin, targets))
}

fn convert_module_rules(dto: &ModuleRulesDto) -> Result<ModuleRules, LoadError> {
    let scope = match dto.scope.as_str() {
        "all" => DependencyScope::AllDependencies,
        "between-modules" => DependencyScope::BetweenModules,
        other => {
            return Err(LoadError::UnknownScope {
                context: "module-rules.scope".to_string(),
                value: other.to_string(),
            })
        }
    };
    let only_through = dto
        .only_through
        .as_deref()
        .map(NamespaceMatcher::new)
        .transpose()
        .map_err(|e| validation("module-rules.only-through")(e.into()))?;
    Ok(ModuleRules {
        respect_allowed_dependencies: dto.respect_allowed_dependencies,
        free_of_cycles: dto.free_of_cycles,
        only_through,
        scope,
    })
}

fn convert_slice(dto: &SliceDto, index: usize) -> Result<SliceDecl, LoadError> {
    let assignment = SliceAssignment::matching(&dto.pattern)
        .map_err(|e| validation(format!("slices[{index}].pattern"))(e.into()))?;
    let assignment = match &dto.name {
        Some(template) => assignment.named(template.clone()),
        None => assignment,
    };
    Ok(SliceDecl::new(
        dto.id.clone(),
        assignment,
        dto.free_of_cycles,
        dto.independent,
    ))
}

fn convert_ignore(
    dto: &IgnoreDependencyDto,
    index: usize,
) -> Result<DependencyPredicate, LoadError> {
    dependencies::between_matching(&dto.origin, &dto.target)
        .map_err(|e| validation(format!("ignore-dependency[{index}]"))(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;

    fn parse_and_load(toml: &str) -> Result<DeclarativeConfig, LoadError> {
        let dto: DeclarativeConfigDto = toml::from_str(toml).unwrap();
        load(dto)
    }

    #[test]
    fn loads_valid_config() {
        let config = parse_and_load(
            r#"
[[modules]]
name = "One"
namespaces = ["app.one.."]

[[modules]]
name = "Two"
namespaces = ["app.two.."]

[allowed-dependencies]
One = ["Two"]

[module-rules]
scope = "all"

[[slices]]
pattern = "app.(*).."
name = "$1 feature"

[[ignore-dependency]]
origin = "app.one.*"
target = "app.two.*"
"#,
        )
        .unwrap();

        assert_eq!(config.modules().len(), 2);
        assert_eq!(config.allowed().len(), 1);
        let rules = config.module_rules().unwrap();
        assert!(matches!(rules.scope, DependencyScope::AllDependencies));
        assert_eq!(config.slices().len(), 1);
        assert_eq!(config.ignored().len(), 1);
    }

    #[test]
    fn invalid_namespace_pattern_has_context() {
        let err = parse_and_load(
            r#"
[[modules]]
name = "One"
namespaces = ["app...one"]
"#,
        )
        .unwrap_err();
        match err {
            LoadError::Validation { context, source } => {
                assert_eq!(context, "modules[0].namespaces[0]");
                assert!(matches!(
                    source,
                    ModelError::Pattern(ConfigurationError::InvalidNamespacePattern { .. })
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn field_errors_are_reported_together() {
        let err = parse_and_load(
            r#"
[[modules]]
name = ""
namespaces = ["app.one.."]

[[slices]]
pattern = "app.feature.."

[module-rules]
scope = "everything"
"#,
        )
        .unwrap_err();
        let LoadError::Fields(errors) = &err else {
            panic!("expected several errors, got {err}");
        };
        assert_eq!(errors.len(), 3);
        let text = err.to_string();
        assert!(text.contains("modules[0].name"), "{text}");
        assert!(text.contains("module-rules.scope"), "{text}");
        assert!(text.contains("slices[0].pattern"), "{text}");
    }

    #[test]
    fn unknown_module_is_cross_ref_error() {
        let err = parse_and_load(
            r#"
[[modules]]
name = "One"
namespaces = ["app.one.."]

[allowed-dependencies]
One = ["Two"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::CrossRef(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("unknown module `Two`"));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let err = parse_and_load(
            r#"
[[ignore-dependency]]
origin = "app.[one"
target = "*"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("ignore-dependency[0]:"), "{err}");
    }
}
