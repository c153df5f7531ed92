//! Inline template registry.
//!
//! Holds the bodies of `{% template %}` definitions by name. The registry is
//! a cheap, cloneable handle: clones share the same map, so the handle passed
//! to a [`PaneEnvironment`](crate::PaneEnvironment) is the one the caller can
//! inspect afterwards. One registry belongs to one render pass at a time and
//! is cleared between passes.

use crate::error::{TemplateError, TemplateResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Name → raw template text, populated by `{% template %}` definitions
#[derive(Debug, Clone, Default)]
pub struct InlineTemplateRegistry {
    templates: Arc<Mutex<HashMap<String, String>>>,
}

impl InlineTemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // The map is always left consistent, so a poisoned lock is still usable.
        self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite a template. Names are not validated here.
    pub fn register(&self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        log::debug!("Registering inline template '{}'", name);
        self.entries().insert(name, content.into());
    }

    /// Check whether a template is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.entries().contains_key(name)
    }

    /// Names of all registered templates, sorted
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().keys().cloned().collect();
        names.sort();
        names
    }

    /// Fetch a template body, failing if the name was never registered
    pub fn read_template_file(&self, name: &str) -> TemplateResult<String> {
        self.entries()
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })
    }

    /// Drop every registered template
    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries().clone()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
