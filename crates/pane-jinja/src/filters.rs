//! Collection filters backed by the condition language.
//!
//! ```jinja
//! {{ users | where_exp("user", "user.age >= 30 and user.active == true") }}
//! {{ users | find_exp("user", "user.role == 'admin'") }}
//! ```

use crate::functions::minijinja_value_to_json;
use minijinja::value::{Value, ValueKind};
use minijinja::Error;
use pane_core::{parse_condition, ConditionNode};

/// Elements of `items` for which `expression` holds with the element bound as
/// `variable`.
pub(crate) fn where_exp(items: Value, variable: &str, expression: &str) -> Result<Value, Error> {
    let condition = parse_condition(expression);
    let matching: Vec<Value> = candidates(&items)?
        .into_iter()
        .filter(|item| holds(&condition, variable, item))
        .collect();
    Ok(Value::from(matching))
}

/// First element of `items` for which `expression` holds, or `none`.
pub(crate) fn find_exp(items: Value, variable: &str, expression: &str) -> Result<Value, Error> {
    let condition = parse_condition(expression);
    Ok(candidates(&items)?
        .into_iter()
        .find(|item| holds(&condition, variable, item))
        .unwrap_or_else(|| Value::from(())))
}

/// Sequences are filtered element-wise, a missing value is empty and any
/// other value, maps included, is a single candidate.
fn candidates(items: &Value) -> Result<Vec<Value>, Error> {
    match items.kind() {
        ValueKind::Undefined | ValueKind::None => Ok(Vec::new()),
        ValueKind::Seq | ValueKind::Iterable => Ok(items.try_iter()?.collect()),
        _ => Ok(vec![items.clone()]),
    }
}

fn holds(condition: &ConditionNode, variable: &str, item: &Value) -> bool {
    let bound = pane_core::Value::from(minijinja_value_to_json(item));
    condition.evaluate(variable, &bound)
}

#[cfg(test)]
#[path = "filters_test.rs"]
mod tests;
