//! Render environment for Pane documents

use crate::error::{TemplateError, TemplateResult};
use crate::filters::{find_exp, where_exp};
use crate::functions::{make_define_template_filter, make_render_partial_fn};
use crate::partial::PartialRenderer;
use crate::registry::InlineTemplateRegistry;
use crate::source::{DirectorySource, SharedSource};
use crate::tags::{expand_document, ParsedDocument, DEFINE_FILTER, RENDER_FUNCTION};
use minijinja::{Environment, UndefinedBehavior};
use pane_core::Config;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Name top-level documents are rendered under, as it appears in errors
const DOCUMENT_NAME: &str = "document";

/// MiniJinja environment with the template/render tags and condition filters.
///
/// Partial depth is counted per thread, so one environment can render from
/// several threads. The inline registry is shared though: [`render`] resets
/// it, so concurrent passes over inline definitions need their own
/// environments.
///
/// [`render`]: PaneEnvironment::render
pub struct PaneEnvironment {
    env: Environment<'static>,
    source: SharedSource,
}

impl PaneEnvironment {
    /// Create an environment backed by a fresh inline registry
    pub fn new() -> Self {
        Self::with_registry(InlineTemplateRegistry::new())
    }

    /// Create an environment backed by `registry`.
    ///
    /// The registry is a shared handle, so the caller's clone observes every
    /// definition made while rendering.
    pub fn with_registry(registry: InlineTemplateRegistry) -> Self {
        Self::with_source(Arc::new(registry), &Config::default())
    }

    /// Create an environment loading partials from `source`
    pub fn with_source(source: SharedSource, config: &Config) -> Self {
        let mut env = Environment::new();
        if config.strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        env.add_filter(DEFINE_FILTER, make_define_template_filter(source.clone()));
        env.add_filter("where_exp", where_exp);
        env.add_filter("find_exp", find_exp);

        let renderer = PartialRenderer::new(source.clone(), config.max_partial_depth);
        env.add_function(RENDER_FUNCTION, make_render_partial_fn(renderer));

        log::debug!(
            "Created environment over {} (max partial depth {})",
            source.describe(),
            config.max_partial_depth
        );
        Self { env, source }
    }

    /// Create an environment as configured: a directory source when
    /// `templates_dir` is set (resolved against `base_dir`), otherwise an
    /// inline registry.
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        let source: SharedSource = match config.templates_dir_absolute(base_dir) {
            Some(dir) => Arc::new(DirectorySource::new(dir)),
            None => Arc::new(InlineTemplateRegistry::new()),
        };
        Self::with_source(source, config)
    }

    pub fn source(&self) -> &SharedSource {
        &self.source
    }

    /// The inline registry, unless partials come from somewhere else
    pub fn registry(&self) -> Option<&InlineTemplateRegistry> {
        self.source.as_inline()
    }

    /// Clear the inline registry before an independent render pass
    pub fn reset(&self) {
        if let Some(registry) = self.registry() {
            registry.clear();
        }
    }

    /// Run only the parse phase, registering definitions into the inline
    /// registry.
    pub fn parse(&self, document: &str) -> TemplateResult<ParsedDocument> {
        expand_document(document, self.registry())
    }

    /// Render a document as a new pass: the registry is reset first
    pub fn render<S: Serialize>(&self, document: &str, context: S) -> TemplateResult<String> {
        self.reset();
        self.render_in_pass(document, context)
    }

    /// Render a document within the current pass, keeping definitions made
    /// by earlier documents.
    pub fn render_in_pass<S: Serialize>(
        &self,
        document: &str,
        context: S,
    ) -> TemplateResult<String> {
        let parsed = self.parse(document)?;
        self.env
            .render_named_str(DOCUMENT_NAME, &parsed.source, context)
            .map_err(TemplateError::from)
    }
}

impl Default for PaneEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
