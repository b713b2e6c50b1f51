//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pathtree/pathtree.toml`
//! 3. Local config: `<project_dir>/.pathtree.toml`
//! 4. Environment variables: `PATHTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_SEPARATOR;

/// Default definitions file name, looked up in the project directory.
pub const DEFAULT_DEFINITIONS: &str = "pathtree.toml";

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub separator: Option<char>,
    pub definitions: Option<PathBuf>,
}

/// Unified configuration for pathtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Path segment separator (default: '/')
    pub separator: char,
    /// Definitions file (default: pathtree.toml, relative to the project dir)
    pub definitions: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            definitions: PathBuf::from(DEFAULT_DEFINITIONS),
        }
    }
}

/// Get the XDG config directory for pathtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pathtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pathtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".pathtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn parse_separator(raw: &str) -> Result<char, ApplicationError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ApplicationError::Config {
            message: format!("separator must be a single character, got '{raw}'"),
        }),
    }
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            separator: overlay.separator.unwrap_or(self.separator),
            definitions: overlay
                .definitions
                .clone()
                .unwrap_or_else(|| self.definitions.clone()),
        }
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.definitions.to_string_lossy().as_ref());
        self.definitions = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory holding `.pathtree.toml`
    #[instrument(level = "debug")]
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!(path = %local_path.display(), "loading local config");
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply PATHTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("PATHTREE"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("separator") {
            settings.separator = parse_separator(&val)?;
        }
        if let Ok(val) = config.get_string("definitions") {
            settings.definitions = PathBuf::from(val);
        }

        Ok(settings)
    }

    /// Definitions file, resolved against `project_dir` when relative.
    pub fn definitions_path(&self, project_dir: &Path) -> PathBuf {
        if self.definitions.is_absolute() {
            self.definitions.clone()
        } else {
            project_dir.join(&self.definitions)
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pathtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/pathtree/pathtree.toml
#   Local:  <project_dir>/.pathtree.toml
#   Env:    PATHTREE_* environment variables (explicit overrides)

# Path segment separator (exactly one character)
# separator = "/"

# Definitions file; relative paths resolve against the project directory
# definitions = "pathtree.toml"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.separator, '/');
        assert_eq!(settings.definitions, PathBuf::from("pathtree.toml"));
    }

    #[test]
    fn given_single_char_when_parsing_separator_then_accepts() {
        assert_eq!(parse_separator(".").unwrap(), '.');
    }

    #[test]
    fn given_multi_char_when_parsing_separator_then_config_error() {
        assert!(matches!(
            parse_separator("::"),
            Err(ApplicationError::Config { .. })
        ));
        assert!(parse_separator("").is_err());
    }

    #[test]
    fn given_overlay_when_merging_then_overlay_wins_where_specified() {
        let base = Settings::default();
        let overlay = RawSettings {
            separator: Some('.'),
            definitions: None,
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.separator, '.');
        assert_eq!(merged.definitions, base.definitions);
    }

    #[test]
    fn given_relative_definitions_when_resolving_then_joins_project_dir() {
        let settings = Settings::default();
        assert_eq!(
            settings.definitions_path(Path::new("/srv/home")),
            PathBuf::from("/srv/home/pathtree.toml")
        );
    }

    #[test]
    fn given_env_var_in_definitions_when_expand_paths_then_expands_variable() {
        // Outside the PATHTREE_ prefix so the env layer never picks it up
        std::env::set_var("DEFS_DIR_FOR_EXPANSION_TEST", "/opt/defs");
        let mut settings = Settings {
            separator: '/',
            definitions: PathBuf::from("$DEFS_DIR_FOR_EXPANSION_TEST/home.toml"),
        };
        settings.expand_paths();
        std::env::remove_var("DEFS_DIR_FOR_EXPANSION_TEST");
        assert_eq!(settings.definitions, PathBuf::from("/opt/defs/home.toml"));
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
