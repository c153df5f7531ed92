//! Render command implementation

use anyhow::{Context, Result};
use pane_jinja::{PaneEnvironment, RenderContext};

use crate::cli::{GlobalArgs, RenderArgs};
use crate::commands::common::{load_config, load_data_file, parse_assignment, read_document};

/// Execute the render command
pub(crate) fn execute(args: &RenderArgs, global: &GlobalArgs) -> Result<()> {
    let document = read_document(&args.file)?;
    let (config, base_dir) = load_config(global, &args.file)?;
    let env = PaneEnvironment::from_config(&config, &base_dir);

    let mut context = RenderContext::new(&config);
    if let Some(path) = &args.data {
        context = context.with_data(load_data_file(path)?);
    }
    for assignment in &args.set {
        let (key, value) = parse_assignment(assignment)?;
        context = context.with_variable(key, value);
    }

    let rendered = env
        .render(&document, context.to_value())
        .with_context(|| format!("Failed to render {}", args.file.display()))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if global.verbose {
                eprintln!("Wrote {} bytes to {}", rendered.len(), path.display());
            }
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
