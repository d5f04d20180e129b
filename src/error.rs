//! Unified error types for api-compat.
//!
//! This module provides the error hierarchy shared by the comparison core,
//! the configuration layer and extension implementations.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for api-compat operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiCompatError {
    /// Pipeline configuration rejected before any traversal started
    #[error("Invalid pipeline configuration:\n{}", format_config_errors(.errors))]
    InvalidConfig { errors: Vec<ConfigError> },

    /// Failures raised by or about a registered extension
    #[error("Extension '{extension_id}' failed: {context}")]
    Extension {
        extension_id: String,
        context: String,
        #[source]
        source: ExtensionErrorKind,
    },

    /// Errors during the paired traversal of two element forests
    #[error("Traversal failed: {context}")]
    Traversal {
        context: String,
        #[source]
        source: TraversalErrorKind,
    },

    /// Errors during difference transformation
    #[error("Transformation failed: {context}")]
    Transform {
        context: String,
        #[source]
        source: TransformErrorKind,
    },

    /// The run was cancelled through its cancellation token
    #[error("Comparison cancelled")]
    Cancelled,

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors that are not part of a validation report
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific extension error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExtensionErrorKind {
    #[error("Could not be instantiated: {0}")]
    Instantiation(String),

    #[error("Invalid extension configuration: {0}")]
    Configuration(String),

    #[error("Difference analyzer error: {0}")]
    Visitor(String),

    #[error("Reporter error: {0}")]
    Reporter(String),

    #[error("Error while closing: {0}")]
    Close(String),

    #[error("{0}")]
    Other(String),
}

/// Specific traversal error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraversalErrorKind {
    #[error("Archive analysis failed: {0}")]
    ArchiveAnalysis(String),
}

/// Specific transformation error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransformErrorKind {
    #[error("Fixpoint not reached after {iterations} iterations")]
    IterationLimitExceeded { iterations: usize },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for api-compat operations
pub type Result<T> = std::result::Result<T, ApiCompatError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ApiCompatError {
    /// Create a configuration error carrying every offending item
    #[must_use]
    pub const fn invalid_config(errors: Vec<ConfigError>) -> Self {
        Self::InvalidConfig { errors }
    }

    /// Create an extension error with context
    pub fn extension(
        extension_id: impl Into<String>,
        context: impl Into<String>,
        source: ExtensionErrorKind,
    ) -> Self {
        Self::Extension {
            extension_id: extension_id.into(),
            context: context.into(),
            source,
        }
    }

    /// Create a generic failure reported by an extension implementation
    pub fn extension_failure(extension_id: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::extension(
            extension_id,
            message.clone(),
            ExtensionErrorKind::Other(message),
        )
    }

    /// Create a traversal error with context
    pub fn traversal(context: impl Into<String>, source: TraversalErrorKind) -> Self {
        Self::Traversal {
            context: context.into(),
            source,
        }
    }

    /// Create a transformation error with context
    pub fn transform(context: impl Into<String>, source: TransformErrorKind) -> Self {
        Self::Transform {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Configuration errors carried by this error, if any
    #[must_use]
    pub fn config_errors(&self) -> &[ConfigError] {
        match self {
            Self::InvalidConfig { errors } => errors,
            _ => &[],
        }
    }
}

fn format_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ApiCompatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ApiCompatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON deserialization: {err}"))
    }
}

impl From<serde_yaml_ng::Error> for ApiCompatError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::Config(format!("YAML deserialization: {err}"))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// creating a chain that shows the path through the code.
///
/// # Example
///
/// ```ignore
/// use api_compat::error::ErrorContext;
///
/// fn open_forest(analyzer: &mut dyn ArchiveAnalyzer<E>) -> Result<ElementForest<E>> {
///     analyzer
///         .analyze(&mut filters)
///         .with_context(|| format!("analyzing {} API", side))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ApiCompatError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: ApiCompatError, new_ctx: &str) -> ApiCompatError {
    match err {
        ApiCompatError::Extension {
            extension_id,
            context: existing,
            source,
        } => ApiCompatError::Extension {
            extension_id,
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiCompatError::Traversal {
            context: existing,
            source,
        } => ApiCompatError::Traversal {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiCompatError::Transform {
            context: existing,
            source,
        } => ApiCompatError::Transform {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiCompatError::Io {
            path,
            message,
            source,
        } => ApiCompatError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ApiCompatError::Config(msg) => ApiCompatError::Config(chain_context(new_ctx, &msg)),
        ApiCompatError::Validation(msg) => {
            ApiCompatError::Validation(chain_context(new_ctx, &msg))
        }
        other @ (ApiCompatError::InvalidConfig { .. } | ApiCompatError::Cancelled) => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| ApiCompatError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| ApiCompatError::Validation(f().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_lists_every_error() {
        let err = ApiCompatError::invalid_config(vec![
            ConfigError {
                field: "severity_mapping".to_string(),
                message: "missing BREAKING".to_string(),
            },
            ConfigError {
                field: "criticalities".to_string(),
                message: "undeclared 'fatal'".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("missing BREAKING"), "{display}");
        assert!(display.contains("undeclared 'fatal'"), "{display}");
        assert_eq!(err.config_errors().len(), 2);
    }

    #[test]
    fn test_extension_error_display() {
        let err = ApiCompatError::extension_failure("java.filter.annotated", "bad regex");
        let display = err.to_string();
        assert!(display.contains("java.filter.annotated"), "{display}");
        assert!(display.contains("bad regex"), "{display}");
    }

    #[test]
    fn test_error_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ApiCompatError::io("/path/to/pipeline.yaml", io_err);

        assert!(err.to_string().contains("/path/to/pipeline.yaml"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(ApiCompatError::traversal(
                "base",
                TraversalErrorKind::ArchiveAnalysis("truncated".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(ApiCompatError::Traversal { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected Traversal error, got {other:?}"),
        }
    }

    #[test]
    fn test_context_keeps_extension_id() {
        let err: Result<()> = Err(ApiCompatError::extension(
            "reporter.text",
            "writing",
            ExtensionErrorKind::Reporter("broken pipe".to_string()),
        ));
        match err.context("delivering report") {
            Err(ApiCompatError::Extension {
                extension_id,
                context,
                ..
            }) => {
                assert_eq!(extension_id, "reporter.text");
                assert_eq!(context, "delivering report: writing");
            }
            other => panic!("Expected Extension error, got {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_ignores_context() {
        let err: Result<()> = Err(ApiCompatError::Cancelled);
        assert!(matches!(
            err.context("traversing"),
            Err(ApiCompatError::Cancelled)
        ));
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(ApiCompatError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        assert_eq!(Some(42).context_none("missing value").unwrap(), 42);

        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(ApiCompatError::Validation(msg)) => assert_eq!(msg, "missing value"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
