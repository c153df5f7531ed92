//! Template sources consumed by the render environment.
//!
//! A [`TemplateSource`] is the file-system-shaped interface partials are
//! loaded through. [`InlineTemplateRegistry`] is one implementation;
//! [`DirectorySource`] reads real files. Definitions only write into a source
//! when [`TemplateSource::as_inline`] says it is backed by a registry.

use crate::error::{TemplateError, TemplateResult};
use crate::registry::InlineTemplateRegistry;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to a template source
pub type SharedSource = Arc<dyn TemplateSource>;

/// Extensions tried after the bare name when loading from a directory
pub const TEMPLATE_EXTENSIONS: [&str; 3] = [".liquid", ".jinja", ".html"];

/// Where partial bodies come from
pub trait TemplateSource: Send + Sync + fmt::Debug {
    /// Load the raw source for `name`, failing with
    /// [`TemplateError::NotFound`] when it does not exist.
    fn load(&self, name: &str) -> TemplateResult<String>;

    /// The inline registry behind this source, if there is one
    fn as_inline(&self) -> Option<&InlineTemplateRegistry> {
        None
    }

    /// Short description for log messages
    fn describe(&self) -> String;
}

impl TemplateSource for InlineTemplateRegistry {
    fn load(&self, name: &str) -> TemplateResult<String> {
        self.read_template_file(name)
    }

    fn as_inline(&self) -> Option<&InlineTemplateRegistry> {
        Some(self)
    }

    fn describe(&self) -> String {
        format!("inline registry ({} templates)", self.len())
    }
}

type PathLoader = Box<dyn Fn(&str) -> Result<Option<String>, minijinja::Error> + Send + Sync>;

/// Partials stored as files under a root directory
pub struct DirectorySource {
    root: PathBuf,
    loader: PathLoader,
}

impl DirectorySource {
    /// Create a source rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let loader: PathLoader = Box::new(minijinja::path_loader(root.clone()));
        Self { root, loader }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl fmt::Debug for DirectorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorySource")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl TemplateSource for DirectorySource {
    fn load(&self, name: &str) -> TemplateResult<String> {
        let candidates = std::iter::once(name.to_string()).chain(
            TEMPLATE_EXTENSIONS
                .iter()
                .map(|ext| format!("{}{}", name, ext)),
        );
        for candidate in candidates {
            // A directory named like the partial must not shadow its files.
            if !self.root.join(&candidate).is_file() {
                continue;
            }
            if let Some(content) = (self.loader)(&candidate)? {
                log::debug!("Loaded '{}' from {}", candidate, self.root.display());
                return Ok(content);
            }
        }
        Err(TemplateError::NotFound {
            name: name.to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
