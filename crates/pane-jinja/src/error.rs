//! Error types for pane-jinja

use minijinja::ErrorKind;
use thiserror::Error;

/// Template definition, lookup and rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Malformed `{% template %}` or `{% render %}` markup (T001)
    #[error("[T001] Template syntax error: {message}")]
    Syntax { message: String },

    /// Partial requested from a source that does not have it (T002)
    #[error("[T002] Template not found: {name}")]
    NotFound { name: String },

    /// Error raised by the template engine while rendering (T003)
    #[error("[T003] Render error: {0}")]
    Render(String),

    /// Partials nested deeper than the configured limit (T004)
    #[error("[T004] Rendering '{name}' exceeds the maximum partial depth of {limit}")]
    RecursionLimit { name: String, limit: usize },
}

/// Result type alias for TemplateError
pub type TemplateResult<T> = Result<T, TemplateError>;

impl TemplateError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        TemplateError::Syntax {
            message: message.into(),
        }
    }

    /// Wrap into a MiniJinja error so it can cross a filter, function or
    /// loader boundary. The original error stays attached as the source and
    /// is recovered by the `From<minijinja::Error>` conversion.
    pub(crate) fn into_minijinja(self) -> minijinja::Error {
        let kind = match &self {
            TemplateError::Syntax { .. } => ErrorKind::SyntaxError,
            TemplateError::NotFound { .. } => ErrorKind::TemplateNotFound,
            TemplateError::Render(_) | TemplateError::RecursionLimit { .. } => {
                ErrorKind::InvalidOperation
            }
        };
        minijinja::Error::new(kind, self.to_string()).with_source(self)
    }
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            if let Some(original) = cause.downcast_ref::<TemplateError>() {
                return original.clone();
            }
            source = cause.source();
        }

        match err.kind() {
            ErrorKind::SyntaxError => TemplateError::Syntax {
                message: err.to_string(),
            },
            _ => TemplateError::Render(err.to_string()),
        }
    }
}
