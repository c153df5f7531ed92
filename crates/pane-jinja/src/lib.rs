//! pane-jinja - MiniJinja templating layer for Pane
//!
//! This crate extends a MiniJinja environment with the constructs used by
//! device display markup:
//!
//! - `{% template name %}...{% endtemplate %}` defines an inline partial whose
//!   raw body is stored in an [`InlineTemplateRegistry`];
//! - `{% render "name", key: expr %}` renders a partial in an isolated scope
//!   that only sees `trmnl`, `size`, `data`, `config` and the call-site
//!   arguments;
//! - the `where_exp` and `find_exp` filters select collection items with the
//!   condition language from [`pane_core::condition`].
//!
//! [`PaneEnvironment`] wires everything together. Root variables for a render
//! pass are assembled with [`RenderContext`].

pub mod context;
pub mod environment;
pub mod error;
mod filters;
mod functions;
pub mod partial;
pub mod registry;
pub mod source;
pub mod tags;

pub use context::{DeviceContext, RenderContext, SystemContext};
pub use environment::PaneEnvironment;
pub use error::{TemplateError, TemplateResult};
pub use partial::{build_partial_context, PartialScope, RootScope, FORWARDED_KEYS};
pub use registry::InlineTemplateRegistry;
pub use source::{DirectorySource, SharedSource, TemplateSource};
pub use tags::{expand_document, ParsedDocument, TemplateDefinition};
