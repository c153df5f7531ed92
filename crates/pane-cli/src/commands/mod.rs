//! CLI command implementations

pub(crate) mod common;
pub(crate) mod condition;
pub(crate) mod render;
pub(crate) mod templates;
