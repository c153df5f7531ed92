//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pane - render device display markup with inline templates and partials
#[derive(Parser, Debug)]
#[command(name = "pane")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to pane.yml (default: pane.yml or pane.yaml next to the document)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a document
    Render(RenderArgs),

    /// List the inline templates a document defines
    Templates(TemplatesArgs),

    /// Parse or evaluate a condition expression
    Condition(ConditionArgs),
}

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Document to render
    pub file: PathBuf,

    /// JSON or YAML file exposed to templates as `data`
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Set a top-level variable; the value is parsed as JSON, or taken as a
    /// string when it is not valid JSON
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the templates command
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Document to inspect
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "names")]
    pub output: TemplatesOutput,
}

/// Templates output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatesOutput {
    /// One template name per line
    Names,
    /// JSON array of names and raw bodies
    Json,
}

/// Arguments for the condition command
#[derive(Args, Debug)]
pub struct ConditionArgs {
    /// Condition expression, e.g. "item.age >= 30 and item.active == true"
    pub expression: String,

    /// Name the value is bound to in the expression
    #[arg(short, long, default_value = "item")]
    pub bind: String,

    /// JSON value to evaluate against (default: null)
    #[arg(long)]
    pub value: Option<String>,

    /// Print the parsed expression tree as JSON instead of evaluating
    #[arg(long)]
    pub ast: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
