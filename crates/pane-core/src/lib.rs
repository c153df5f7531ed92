//! pane-core - Core library for Pane
//!
//! This crate provides the pieces of Pane that do not depend on the template
//! engine: the dynamically-typed [`Value`] model, the condition expression
//! language used by collection filters, validated [`TemplateName`]s, and the
//! `pane.yml` configuration.

pub mod condition;
pub mod config;
pub mod error;
pub mod template_name;
pub mod value;

pub use condition::{
    evaluate_condition, parse_condition, resolve_value, ComparisonOperator, ConditionNode,
};
pub use config::{Config, ScreenSize};
pub use error::{CoreError, CoreResult};
pub use template_name::TemplateName;
pub use value::Value;
