//! Condition command implementation

use anyhow::{Context, Result};
use pane_core::{parse_condition, Value};

use crate::cli::{ConditionArgs, GlobalArgs};

/// Execute the condition command
pub(crate) fn execute(args: &ConditionArgs, global: &GlobalArgs) -> Result<()> {
    let node = parse_condition(&args.expression);

    if args.ast {
        println!("{}", serde_json::to_string_pretty(&node)?);
        return Ok(());
    }

    let value = match &args.value {
        Some(json) => {
            let parsed: serde_json::Value =
                serde_json::from_str(json).context("--value must be valid JSON")?;
            Value::from(parsed)
        }
        None => Value::Null,
    };
    if global.verbose {
        eprintln!("Evaluating against {} = {}", args.bind, value);
    }

    println!("{}", node.evaluate(&args.bind, &value));
    Ok(())
}
