//! Configuration types and parsing for pane.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file names searched by [`Config::load_or_default`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["pane.yml", "pane.yaml"];

const DEFAULT_MAX_PARTIAL_DEPTH: usize = 32;

/// Render configuration from pane.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding partial templates on disk.
    ///
    /// When unset, partials come from the inline registry populated by
    /// `{% template %}` definitions. When set, definitions are no-ops.
    #[serde(default)]
    pub templates_dir: Option<String>,

    /// Maximum nesting of `{% render %}` calls before rendering fails
    #[serde(default = "default_max_partial_depth")]
    pub max_partial_depth: usize,

    /// Fail on undefined variables instead of rendering them as empty
    #[serde(default)]
    pub strict_undefined: bool,

    /// Target screen dimensions, exposed to templates as `size`
    #[serde(default)]
    pub size: ScreenSize,

    /// User variables, exposed to templates as `config`
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,
}

/// Screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

fn default_max_partial_depth() -> usize {
    DEFAULT_MAX_PARTIAL_DEPTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: None,
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
            strict_undefined: false,
            size: ScreenSize::default(),
            vars: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load pane.yml or pane.yaml from a directory, falling back to defaults
    /// when neither exists.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
        {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve `templates_dir` against a base directory
    pub fn templates_dir_absolute(&self, base: &Path) -> Option<PathBuf> {
        self.templates_dir.as_ref().map(|dir| {
            let path = Path::new(dir);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.max_partial_depth == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "max_partial_depth must be greater than 0".to_string(),
            });
        }

        if self.size.width == 0 || self.size.height == 0 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "size must be non-zero, got {}x{}",
                    self.size.width, self.size.height
                ),
            });
        }

        if self.templates_dir.as_deref() == Some("") {
            return Err(CoreError::ConfigInvalid {
                message: "templates_dir cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
