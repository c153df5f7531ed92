//! Template callbacks behind the rewritten tags, plus value conversions.

use crate::partial::PartialRenderer;
use crate::source::SharedSource;
use minijinja::value::{Value, ValueKind};
use minijinja::{Error, ErrorKind, State};

/// Create the filter that receives a rendered `{% template %}` body.
///
/// The body is re-registered under its name when the source is an inline
/// registry; any other source ignores it. Always returns an empty string.
pub(crate) fn make_define_template_filter(
    source: SharedSource,
) -> impl Fn(String, String) -> String + Send + Sync + Clone + 'static {
    move |body: String, name: String| {
        match source.as_inline() {
            Some(registry) => registry.register(name, body),
            None => log::debug!(
                "Ignoring definition of '{}': {} is not an inline registry",
                name,
                source.describe()
            ),
        }
        String::new()
    }
}

/// Create the function that `{% render %}` tags are rewritten into.
///
/// ```jinja
/// {{ pane_render_partial("card", {"title": page.title}, {}, none) }}
/// ```
pub(crate) fn make_render_partial_fn(
    renderer: PartialRenderer,
) -> impl Fn(&State, String, Value, Value, Option<String>) -> Result<Value, Error>
       + Send
       + Sync
       + Clone
       + 'static {
    move |state: &State, name: String, arguments: Value, bindings: Value, iterate: Option<String>| {
        renderer
            .render(state, &name, &arguments, &bindings, iterate.as_deref())
            .map(Value::from_safe_string)
    }
}

/// Key/value pairs of a map value. `none` and undefined yield no entries.
pub(crate) fn map_entries(value: &Value) -> Result<Vec<(String, Value)>, Error> {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => return Ok(Vec::new()),
        ValueKind::Map => {}
        kind => {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("expected a map of partial variables, got {:?}", kind),
            ))
        }
    }

    let mut entries = Vec::new();
    for key in value.try_iter()? {
        let item = value.get_item(&key)?;
        let key = match key.as_str() {
            Some(s) => s.to_string(),
            None => key.to_string(),
        };
        entries.push((key, item));
    }
    Ok(entries)
}

/// Convert serde_yaml::Value to serde_json::Value
pub(crate) fn yaml_to_json(yaml: &serde_yaml::Value) -> serde_json::Value {
    match yaml {
        serde_yaml::Value::Null => serde_json::Value::Null,
        serde_yaml::Value::Bool(b) => serde_json::Value::Bool(*b),
        serde_yaml::Value::Number(n) => convert_yaml_number(n),
        serde_yaml::Value::String(s) => serde_json::Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => {
            serde_json::Value::Array(seq.iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let obj: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .filter_map(|(k, v)| k.as_str().map(|key| (key.to_string(), yaml_to_json(v))))
                .collect();
            serde_json::Value::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn convert_yaml_number(n: &serde_yaml::Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        return serde_json::Value::Number(i.into());
    }
    if let Some(f) = n.as_f64() {
        return match serde_json::Number::from_f64(f) {
            Some(num) => serde_json::Value::Number(num),
            None => {
                log::warn!("YAML number {} is NaN or Infinity; converting to null", f);
                serde_json::Value::Null
            }
        };
    }
    serde_json::Value::Null
}

/// Convert a minijinja Value to a serde_json::Value.
///
/// Used to hand template values to the condition evaluator. Values with no
/// JSON shape (functions, objects without a map or sequence form) become
/// their string form.
pub(crate) fn minijinja_value_to_json(val: &Value) -> serde_json::Value {
    match val.kind() {
        ValueKind::Undefined | ValueKind::None => serde_json::Value::Null,
        ValueKind::Bool => serde_json::Value::Bool(val.is_true()),
        // Floats stay floats even when whole, so `9.0 == 9.0` still holds
        // under strict equality.
        ValueKind::Number if val.is_integer() => i64::try_from(val.clone())
            .map(|i| serde_json::Value::Number(i.into()))
            .or_else(|_| f64::try_from(val.clone()).map(float_to_json))
            .unwrap_or(serde_json::Value::Null),
        ValueKind::Number => f64::try_from(val.clone())
            .map(float_to_json)
            .unwrap_or(serde_json::Value::Null),
        ValueKind::String => {
            serde_json::Value::String(val.as_str().unwrap_or_default().to_string())
        }
        ValueKind::Seq | ValueKind::Iterable => {
            let items: Vec<serde_json::Value> = val
                .try_iter()
                .map(|iter| iter.map(|v| minijinja_value_to_json(&v)).collect())
                .unwrap_or_default();
            serde_json::Value::Array(items)
        }
        ValueKind::Map => build_json_map(val),
        _ => serde_json::Value::String(val.to_string()),
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn build_json_map(val: &Value) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    if let Ok(keys) = val.try_iter() {
        for key in keys {
            let key_str = match key.as_str() {
                Some(s) => s.to_string(),
                None => key.to_string(),
            };
            if let Ok(v) = val.get_item(&key) {
                map.insert(key_str, minijinja_value_to_json(&v));
            }
        }
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
