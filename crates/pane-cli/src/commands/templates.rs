//! Templates command implementation

use anyhow::{Context, Result};
use pane_jinja::PaneEnvironment;
use serde::Serialize;

use crate::cli::{GlobalArgs, TemplatesArgs, TemplatesOutput};
use crate::commands::common::read_document;

#[derive(Serialize)]
struct TemplateEntry<'a> {
    name: &'a str,
    body: &'a str,
}

/// Execute the templates command
pub(crate) fn execute(args: &TemplatesArgs, _global: &GlobalArgs) -> Result<()> {
    let document = read_document(&args.file)?;
    let parsed = PaneEnvironment::new()
        .parse(&document)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    match args.output {
        TemplatesOutput::Names => {
            for definition in &parsed.definitions {
                println!("{}", definition.name);
            }
        }
        TemplatesOutput::Json => {
            let entries: Vec<TemplateEntry<'_>> = parsed
                .definitions
                .iter()
                .map(|d| TemplateEntry {
                    name: d.name.as_str(),
                    body: &d.raw_body,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
