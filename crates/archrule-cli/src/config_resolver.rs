//! Locating the configuration file.
//!
//! Candidates, first match wins:
//!
//! 1. `--config <path>`
//! 2. `$ARCHRULE_CONFIG`
//! 3. `archrule.toml`, then `.archrule.toml`, in the project directory
//! 4. `config.toml` in `$ARCHRULE_CONFIG_DIR`, else in `~/.archrule/`
//!
//! Explicit paths (1 and 2) are taken as given; reading them reports a
//! missing file. Without any candidate, evaluation runs on default settings
//! and no rules are declared.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "ARCHRULE_CONFIG";

/// Environment variable naming the global configuration directory.
pub const CONFIG_DIR_ENV: &str = "ARCHRULE_CONFIG_DIR";

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["archrule.toml", ".archrule.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Flag(PathBuf),
    /// Named by `$ARCHRULE_CONFIG`.
    Environment(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found; built-in defaults.
    Default,
}

impl ConfigSource {
    /// The file to read, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Environment(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Environment(p) => write!(f, "{} (${CONFIG_ENV})", p.display()),
            Self::Project(p) => write!(f, "{}", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

/// Inputs of the lookup, gathered up front so tests never touch the
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    /// Value of `--config`.
    pub flag: Option<PathBuf>,
    /// Value of `$ARCHRULE_CONFIG`.
    pub env_config: Option<PathBuf>,
    /// Global config directory.
    pub global_dir: Option<PathBuf>,
}

impl Lookup {
    /// Reads the environment; `flag` is the `--config` value.
    #[must_use]
    pub fn from_env(flag: Option<PathBuf>) -> Self {
        Self {
            flag,
            env_config: non_empty(std::env::var_os(CONFIG_ENV)),
            global_dir: non_empty(std::env::var_os(CONFIG_DIR_ENV))
                .or_else(|| home::home_dir().map(|home| home.join(".archrule"))),
        }
    }

    /// Picks the configuration for `project_dir`.
    #[must_use]
    pub fn resolve(self, project_dir: &Path) -> ConfigSource {
        if let Some(path) = self.flag {
            return ConfigSource::Flag(path);
        }
        if let Some(path) = self.env_config {
            return ConfigSource::Environment(path);
        }

        let project = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = project {
            return ConfigSource::Project(path);
        }

        match self.global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
            Some(path) if path.is_file() => ConfigSource::Global(path),
            _ => ConfigSource::Default,
        }
    }
}

/// Empty variables count as unset.
fn non_empty(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}
