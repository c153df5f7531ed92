//! Partial invocation: isolated scopes for `{% render %}`.
//!
//! A partial renders in a fresh scope that does not fall through to its
//! caller. Only the [`FORWARDED_KEYS`] are copied from the root scope, then
//! call-site arguments and attribute bindings are layered on top, in that
//! order, with later layers winning.

use crate::error::{TemplateError, TemplateResult};
use crate::functions::map_entries;
use crate::source::SharedSource;
use crate::tags::expand_document;
use minijinja::value::ValueKind;
use minijinja::{State, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

/// Root variables a partial can see without being passed them explicitly
pub const FORWARDED_KEYS: [&str; 4] = ["trmnl", "size", "data", "config"];

/// Read access to the scope a partial is invoked from
pub trait RootScope {
    /// Value of `key`, or `None` when it is not defined
    fn lookup(&self, key: &str) -> Option<Value>;
}

impl RootScope for State<'_, '_> {
    fn lookup(&self, key: &str) -> Option<Value> {
        State::lookup(self, key)
    }
}

impl RootScope for BTreeMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl RootScope for HashMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Variables visible inside one partial render
#[derive(Debug, Clone, PartialEq)]
pub struct PartialScope {
    template_name: String,
    variables: BTreeMap<String, Value>,
}

impl PartialScope {
    /// Create an empty scope for `template_name`
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Name of the partial this scope was built for
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.variables.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// Variable names, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Overlay variables, later entries winning
    pub fn extend(&mut self, variables: impl IntoIterator<Item = (String, Value)>) {
        self.variables.extend(variables);
    }

    /// Convert into a map value usable as a render context
    pub fn into_value(self) -> Value {
        Value::from_iter(self.variables)
    }
}

/// Build the isolated scope for rendering `template_name`.
///
/// Forwarded root keys are copied when defined (a `none` value counts as
/// defined), then `explicit` variables are overlaid.
pub fn build_partial_context<R, I>(root: &R, template_name: &str, explicit: I) -> PartialScope
where
    R: RootScope + ?Sized,
    I: IntoIterator<Item = (String, Value)>,
{
    let mut scope = PartialScope::new(template_name);
    for key in FORWARDED_KEYS {
        if let Some(value) = root.lookup(key).filter(|v| !v.is_undefined()) {
            scope.set(key, value);
        }
    }
    scope.extend(explicit);
    scope
}

/// Renders partials from a template source, tracking nesting depth
#[derive(Debug, Clone)]
pub(crate) struct PartialRenderer {
    source: SharedSource,
    max_depth: usize,
    depth: Arc<DepthTracker>,
}

impl PartialRenderer {
    pub(crate) fn new(source: SharedSource, max_depth: usize) -> Self {
        Self {
            source,
            max_depth,
            depth: Arc::new(DepthTracker::default()),
        }
    }

    /// Render partial `name` for a `{% render %}` call.
    ///
    /// `arguments` and `bindings` are maps; binding values were evaluated in
    /// the caller's scope. With `iterate_alias` set, the bound value under
    /// that alias is rendered once per element.
    pub(crate) fn render(
        &self,
        state: &State<'_, '_>,
        name: &str,
        arguments: &Value,
        bindings: &Value,
        iterate_alias: Option<&str>,
    ) -> Result<String, minijinja::Error> {
        let _guard = DepthGuard::enter(&self.depth, self.max_depth, name)
            .map_err(TemplateError::into_minijinja)?;

        let body = self
            .source
            .load(name)
            .map_err(TemplateError::into_minijinja)?;
        let parsed = expand_document(&body, self.source.as_inline())
            .map_err(TemplateError::into_minijinja)?;

        let mut scope = build_partial_context(state, name, map_entries(arguments)?);
        let bound = map_entries(bindings)?;

        let Some(alias) = iterate_alias else {
            scope.extend(bound);
            return self.render_scope(state, &parsed.source, scope);
        };

        let collection = bindings.get_attr(alias)?;
        let items: Vec<Value> = match collection.kind() {
            ValueKind::Seq | ValueKind::Iterable => collection.try_iter()?.collect(),
            _ => vec![collection],
        };
        scope.extend(bound);

        let length = items.len();
        let mut out = String::new();
        for (index0, item) in items.into_iter().enumerate() {
            let mut iteration = scope.clone();
            iteration.set(alias, item);
            iteration.set("forloop", forloop(index0, length));
            out.push_str(&self.render_scope(state, &parsed.source, iteration)?);
        }
        Ok(out)
    }

    fn render_scope(
        &self,
        state: &State<'_, '_>,
        source: &str,
        scope: PartialScope,
    ) -> Result<String, minijinja::Error> {
        let name = scope.template_name().to_string();
        log::debug!("Rendering partial '{}' with {} variables", name, scope.len());
        // Render from source every time: a definition may have replaced the
        // body since the last call.
        state
            .env()
            .render_named_str(&name, source, scope.into_value())
    }
}

fn forloop(index0: usize, length: usize) -> Value {
    Value::from_iter([
        ("index", Value::from(index0 + 1)),
        ("index0", Value::from(index0)),
        ("first", Value::from(index0 == 0)),
        ("last", Value::from(index0 + 1 == length)),
        ("length", Value::from(length)),
    ])
}

/// Partial nesting depth per rendering thread.
///
/// A render runs start to finish on one thread, so keying by thread keeps
/// concurrent renders on a shared environment from adding up.
#[derive(Debug, Default)]
pub(crate) struct DepthTracker {
    levels: Mutex<HashMap<ThreadId, usize>>,
}

impl DepthTracker {
    /// Current depth on the calling thread
    #[cfg(test)]
    fn current(&self) -> usize {
        self.with_levels(|levels| levels.get(&thread::current().id()).copied().unwrap_or(0))
    }

    fn increment(&self) -> usize {
        self.with_levels(|levels| {
            let level = levels.entry(thread::current().id()).or_insert(0);
            *level += 1;
            *level
        })
    }

    fn decrement(&self) {
        self.with_levels(|levels| {
            let id = thread::current().id();
            if let Some(level) = levels.get_mut(&id) {
                *level = level.saturating_sub(1);
                if *level == 0 {
                    levels.remove(&id);
                }
            }
        })
    }

    fn with_levels<T>(&self, f: impl FnOnce(&mut HashMap<ThreadId, usize>) -> T) -> T {
        let mut levels = self.levels.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut levels)
    }
}

/// Holds one level of partial nesting until dropped
struct DepthGuard<'a> {
    depth: &'a DepthTracker,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a DepthTracker, limit: usize, name: &str) -> TemplateResult<Self> {
        let level = depth.increment();
        let guard = Self { depth };
        if level > limit {
            return Err(TemplateError::RecursionLimit {
                name: name.to_string(),
                limit,
            });
        }
        Ok(guard)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.decrement();
    }
}

#[cfg(test)]
#[path = "partial_test.rs"]
mod tests;
