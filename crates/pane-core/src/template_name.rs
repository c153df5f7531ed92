//! Validated inline template names.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::OnceLock;

/// Name of an inline template definition.
///
/// Guaranteed to match `^[A-Za-z0-9_/]+$`, so names such as `card` or
/// `layouts/full_width` are accepted while `invalid-name` is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateName(String);

fn name_pattern() -> &'static regex::Regex {
    static NAME_PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    NAME_PATTERN.get_or_init(|| regex::Regex::new(r"^[A-Za-z0-9_/]+$").expect("valid regex literal"))
}

impl TemplateName {
    /// Validate and wrap a template name.
    pub fn parse(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        if name_pattern().is_match(&name) {
            Ok(Self(name))
        } else {
            Err(CoreError::InvalidTemplateName { name })
        }
    }

    /// Check a name without allocating a wrapper.
    pub fn is_valid(name: &str) -> bool {
        name_pattern().is_match(name)
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `/`-separated segment, e.g. `card` for `widgets/card`.
    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TemplateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TemplateName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TemplateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TemplateName {
    type Error = CoreError;

    fn try_from(name: String) -> CoreResult<Self> {
        Self::parse(name)
    }
}

impl TryFrom<&str> for TemplateName {
    type Error = CoreError;

    fn try_from(name: &str) -> CoreResult<Self> {
        Self::parse(name)
    }
}

impl From<TemplateName> for String {
    fn from(name: TemplateName) -> Self {
        name.0
    }
}

impl PartialEq<str> for TemplateName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TemplateName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "template_name_test.rs"]
mod tests;
