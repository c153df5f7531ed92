//! Root variables for a render pass.
//!
//! Documents see `trmnl`, `size`, `data` and `config` at the top level,
//! plus any extra variables the caller adds. The first four are the keys
//! partials inherit.

use crate::functions::yaml_to_json;
use pane_core::{Config, ScreenSize};
use serde::Serialize;
use std::collections::BTreeMap;

/// Information about the render itself, exposed as `trmnl.system`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemContext {
    /// Unique identifier for this render (UUID v4)
    pub render_id: String,
    /// RFC 3339 timestamp when the render context was created
    pub timestamp_utc: String,
    /// pane version from Cargo.toml
    pub pane_version: String,
}

impl SystemContext {
    /// Create a system context for a new render
    pub fn new() -> Self {
        Self {
            render_id: uuid::Uuid::new_v4().to_string(),
            timestamp_utc: chrono::Utc::now().to_rfc3339(),
            pane_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for SystemContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The `trmnl` variable: system info plus caller-supplied device data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceContext {
    pub system: SystemContext,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Top-level render context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderContext {
    pub trmnl: DeviceContext,
    pub size: ScreenSize,
    /// Plugin data, usually loaded from a JSON or YAML file
    pub data: serde_json::Value,
    /// User variables from pane.yml
    pub config: serde_json::Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RenderContext {
    /// Build a context from configuration, with empty data
    pub fn new(config: &Config) -> Self {
        let vars: serde_json::Map<String, serde_json::Value> = config
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), yaml_to_json(v)))
            .collect();
        Self {
            trmnl: DeviceContext {
                system: SystemContext::new(),
                extra: BTreeMap::new(),
            },
            size: config.size,
            data: serde_json::Value::Object(serde_json::Map::new()),
            config: serde_json::Value::Object(vars),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Replace the system info, e.g. with fixed values for reproducible output
    pub fn with_system(mut self, system: SystemContext) -> Self {
        self.trmnl.system = system;
        self
    }

    /// Add device data under `trmnl.<key>`
    pub fn with_device_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.trmnl.extra.insert(key.into(), value);
        self
    }

    /// Set a top-level variable.
    ///
    /// `data` and `config` replace the corresponding field. `trmnl` and
    /// `size` are built from configuration and cannot be replaced; attempts
    /// are logged and ignored.
    pub fn with_variable(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let key = key.into();
        match key.as_str() {
            "data" => self.data = value,
            "config" => self.config = value,
            "trmnl" | "size" => log::warn!("Ignoring attempt to replace the '{}' variable", key),
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Convert into a MiniJinja value for rendering
    pub fn to_value(&self) -> minijinja::Value {
        minijinja::Value::from_serialize(self)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
