// LogInspector - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every variant keeps its cause reachable through `Error::source` so the
// binary can log the full chain.

use chrono::{DateTime, Utc};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Boxed error returned by pluggable backends (paged queries, evaluators).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all LogInspector operations.
#[derive(Debug)]
pub enum InspectorError {
    /// Caller misuse: bad search request or malformed option. Never retried.
    Validation(ValidationError),

    /// A source's paged query failed. The backend error is kept verbatim.
    Query { source_id: String, source: BoxError },

    /// A query expression could not be evaluated during extraction.
    Evaluation(EvaluationError),

    /// A result value could not be canonicalised to JSON text.
    Serialization(serde_json::Error),

    /// The requested time window could not be resolved.
    Window(WindowError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// Writing results failed.
    Output(OutputError),
}

impl fmt::Display for InspectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "Invalid request: {e}"),
            Self::Query { source_id, source } => {
                write!(f, "Query failed for source '{source_id}': {source}")
            }
            Self::Evaluation(e) => write!(f, "Evaluation error: {e}"),
            Self::Serialization(e) => write!(f, "Serialization error: {e}"),
            Self::Window(e) => write!(f, "Invalid time window: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Output(e) => write!(f, "Output error: {e}"),
        }
    }
}

impl std::error::Error for InspectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Query { source, .. } => Some(source.as_ref()),
            Self::Evaluation(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Window(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Output(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Errors caused by an invalid search request or option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No sources were supplied.
    NoSources,

    /// The filter expression is empty.
    EmptyFilter,

    /// The same source was listed more than once.
    DuplicateSource { source_id: String },

    /// The window start lies after the window end.
    InvertedWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// An `--extract` value is not of the form `name=path`.
    InvalidExtractSpec { spec: String, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSources => write!(f, "no log sources configured"),
            Self::EmptyFilter => write!(f, "empty filter pattern"),
            Self::DuplicateSource { source_id } => {
                write!(f, "source '{source_id}' listed more than once")
            }
            Self::InvertedWindow { start, end } => write!(
                f,
                "window start {} is after window end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            ),
            Self::InvalidExtractSpec { spec, reason } => write!(
                f,
                "invalid --extract '{spec}': {reason}; expected name=path"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for InspectorError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Evaluation errors
// ---------------------------------------------------------------------------

/// Errors raised while evaluating a query expression.
#[derive(Debug)]
pub enum EvaluationError {
    /// The expression failed to compile or to run against the subject.
    InvalidExpression { expression: String, source: BoxError },

    /// The evaluator's native result could not be converted to a JSON value.
    ResultConversion {
        expression: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidExpression { expression, source } => {
                write!(f, "expression '{expression}' failed: {source}")
            }
            Self::ResultConversion { expression, source } => write!(
                f,
                "result of expression '{expression}' is not representable as JSON: {source}"
            ),
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidExpression { source, .. } => Some(source.as_ref()),
            Self::ResultConversion { source, .. } => Some(source),
        }
    }
}

impl From<EvaluationError> for InspectorError {
    fn from(e: EvaluationError) -> Self {
        Self::Evaluation(e)
    }
}

// ---------------------------------------------------------------------------
// File source errors
// ---------------------------------------------------------------------------

/// Errors raised by the file-backed paged source.
#[derive(Debug)]
pub enum SourceError {
    /// The source name cannot be mapped to a directory under the root.
    InvalidName { source_id: String },

    /// The source directory does not exist.
    NotFound { path: PathBuf },

    /// The source path exists but is not a directory.
    NotADirectory { path: PathBuf },

    /// A `%regex%` filter pattern failed to compile.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A continuation token was not produced by this source.
    InvalidToken { token: String },

    /// Walkdir traversal error inside a source directory.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// I/O error reading a stream file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { source_id } => {
                write!(f, "source name '{source_id}' is not a valid relative path")
            }
            Self::NotFound { path } => {
                write!(f, "source directory '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "source path '{}' is not a directory", path.display())
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid regex filter pattern '{pattern}': {source}")
            }
            Self::InvalidToken { token } => {
                write!(f, "unrecognised continuation token '{token}'")
            }
            Self::Traversal { path, source } => {
                write!(f, "error traversing '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "I/O error reading '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Window errors
// ---------------------------------------------------------------------------

/// Errors resolving the `--start` / `--end` search window.
#[derive(Debug)]
pub enum WindowError {
    /// A bound is not a valid RFC3339 timestamp.
    InvalidTimestamp {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    /// The resolved start lies after the resolved end.
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimestamp {
                field,
                value,
                source,
            } => write!(f, "--{field} '{value}' is not RFC3339: {source}"),
            Self::StartAfterEnd { .. } => write!(f, "start is after end"),
        }
    }
}

impl std::error::Error for WindowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTimestamp { source, .. } => Some(source),
            Self::StartAfterEnd { .. } => None,
        }
    }
}

impl From<WindowError> for InspectorError {
    fn from(e: WindowError) -> Self {
        Self::Window(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors loading an explicitly requested configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for InspectorError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// Errors writing search results.
#[derive(Debug)]
pub enum OutputError {
    /// I/O error writing to the output stream.
    Io(io::Error),

    /// CSV serialisation error.
    Csv(csv::Error),

    /// JSON serialisation error.
    Json(serde_json::Error),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "write failed: {e}"),
            Self::Csv(e) => write!(f, "CSV encode failed: {e}"),
            Self::Json(e) => write!(f, "JSON encode failed: {e}"),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<OutputError> for InspectorError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

/// Convenience type alias for LogInspector results.
pub type Result<T> = std::result::Result<T, InspectorError>;
