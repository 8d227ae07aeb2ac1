//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treehouse/treehouse.toml`
//! 3. Local config: `--config <file>`, or `./.treehouse.toml` if present
//! 4. Environment variables: `TREEHOUSE_*` prefix, `__` between sections
//!    (`TREEHOUSE_TREE__EXPANDED=false`)
//!
//! The result is resolved once; the engine only ever sees an immutable
//! `TreeOptions`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::TreeOptions;

/// Unified configuration for treehouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Tree behaviour switches
    pub tree: TreeOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pretty: true,
            tree: TreeOptions::default(),
        }
    }
}

/// Raw tree options for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeOptions {
    pub indent_length: Option<u32>,
    pub expand_icon: Option<String>,
    pub collapse_icon: Option<String>,
    pub animation_time: Option<u64>,
    pub expanded: Option<bool>,
    pub child_updates_parent: Option<bool>,
    pub parent_selects_children: Option<bool>,
    pub checked_parent_must_have_checked_children: Option<bool>,
    pub click_to_expand: Option<bool>,
    pub click_to_check: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub pretty: Option<bool>,
    pub tree: RawTreeOptions,
}

impl RawTreeOptions {
    /// Overlay the specified fields onto `base`.
    pub fn apply_to(&self, base: &TreeOptions) -> TreeOptions {
        TreeOptions {
            indent_length: self.indent_length.unwrap_or(base.indent_length),
            expand_icon: self
                .expand_icon
                .clone()
                .unwrap_or_else(|| base.expand_icon.clone()),
            collapse_icon: self
                .collapse_icon
                .clone()
                .unwrap_or_else(|| base.collapse_icon.clone()),
            animation_time: self.animation_time.unwrap_or(base.animation_time),
            expanded: self.expanded.unwrap_or(base.expanded),
            child_updates_parent: self
                .child_updates_parent
                .unwrap_or(base.child_updates_parent),
            parent_selects_children: self
                .parent_selects_children
                .unwrap_or(base.parent_selects_children),
            checked_parent_must_have_checked_children: self
                .checked_parent_must_have_checked_children
                .unwrap_or(base.checked_parent_must_have_checked_children),
            click_to_expand: self.click_to_expand.unwrap_or(base.click_to_expand),
            click_to_check: self.click_to_check.unwrap_or(base.click_to_check),
        }
    }
}

/// Get the XDG config directory for treehouse.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treehouse").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treehouse.toml"))
}

/// Get the path of the implicit local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treehouse.toml")
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

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            pretty: overlay.pretty.unwrap_or(self.pretty),
            tree: overlay.tree.apply_to(&self.tree),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; must exist when given. Without
    ///   it, `./.treehouse.toml` is used if present.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("config: global {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        let local_path = match local {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .map(|dir| local_config_path(&dir))
                .filter(|path| path.exists()),
        };
        if let Some(path) = local_path {
            debug!("config: local {}", path.display());
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("TREEHOUSE")
            .prefix_separator("_")
            .separator("__")
    }

    /// Apply `TREEHOUSE_*` variables from `env` as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }

        let tree = &mut settings.tree;
        if let Ok(val) = config.get_int("tree.indent_length") {
            tree.indent_length = u32::try_from(val).map_err(|e| ApplicationError::Config {
                message: format!("tree.indent_length: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("tree.expand_icon") {
            tree.expand_icon = val;
        }
        if let Ok(val) = config.get_string("tree.collapse_icon") {
            tree.collapse_icon = val;
        }
        if let Ok(val) = config.get_int("tree.animation_time") {
            tree.animation_time = u64::try_from(val).map_err(|e| ApplicationError::Config {
                message: format!("tree.animation_time: {e}"),
            })?;
        }
        let switches: [(&str, &mut bool); 6] = [
            ("tree.expanded", &mut tree.expanded),
            ("tree.child_updates_parent", &mut tree.child_updates_parent),
            ("tree.parent_selects_children", &mut tree.parent_selects_children),
            (
                "tree.checked_parent_must_have_checked_children",
                &mut tree.checked_parent_must_have_checked_children,
            ),
            ("tree.click_to_expand", &mut tree.click_to_expand),
            ("tree.click_to_check", &mut tree.click_to_check),
        ];
        for (key, field) in switches {
            if let Ok(val) = config.get_bool(key) {
                *field = val;
            }
        }

        Ok(settings)
    }

    /// Apply overrides from an explicit variable map instead of the process environment.
    pub fn with_env_overrides(self, vars: HashMap<String, String>) -> Result<Self, ApplicationError> {
        Self::apply_env_overrides(self, Self::environment().source(Some(vars)))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treehouse configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treehouse/treehouse.toml
#   Local:  --config <file>, or ./.treehouse.toml
#   Env:    TREEHOUSE_* environment variables, e.g. TREEHOUSE_TREE__EXPANDED=false

# Pretty-print JSON output
# pretty = true

[tree]
# Presentation: indent per depth level, affordance glyphs, animation (ms)
# indent_length = 30
# expand_icon = "+"
# collapse_icon = "-"
# animation_time = 300

# Expand nodes that do not say otherwise
# expanded = true

# Checking a child checks all its ancestors
# child_updates_parent = true

# Checking/unchecking a parent does the same to all descendants
# parent_selects_children = true

# A checked parent whose last checked descendant is unchecked gets unchecked
# checked_parent_must_have_checked_children = true

# Label click expands/collapses nodes with children...
# click_to_expand = true
# ...and otherwise toggles the checkbox
# click_to_check = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
