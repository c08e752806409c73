//! Error types for release processing.
//!
//! Every [`Error`] maps onto an [`ErrorKind`]. The kind decides what happens at
//! the distribution/packager boundary: configuration errors abort before any
//! side effect, tool execution errors honour `continue_on_error`, unexpected
//! errors always propagate.

use std::{
    fmt, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Result type alias for release processing.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a processing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The model is invalid or incomplete.
    Configuration,
    /// A packager step failed: template expansion, file copy, external command.
    ToolExecution,
    /// The environment misbehaved in a way no packager anticipated.
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::ToolExecution => "tool execution",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

/// Collector for configuration problems found during a validation pass.
///
/// Recording an error never stops the pass; callers convert the collector into
/// a result once every entity has been visited.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationErrors {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a configuration error.
    pub fn configuration(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("configuration error: {}", message);
        self.errors.push(message);
    }

    /// Records a warning. Warnings never fail validation.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns `true` when at least one configuration error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Configuration error messages in the order they were recorded.
    pub fn messages(&self) -> &[String] {
        &self.errors
    }

    /// Warning messages in the order they were recorded.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of configuration errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` when no configuration error was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Moves the entries of `other` into this collector.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Logs warnings and turns recorded errors into [`Error::Configuration`].
    pub fn into_result(self) -> Result<()> {
        for warning in &self.warnings {
            log::warn!("{}", warning);
        }
        if self.has_errors() {
            Err(Error::Configuration(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, message) in self.errors.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", message)?;
        }
        Ok(())
    }
}

/// Errors raised while validating and processing a release.
#[derive(Error, Debug)]
pub enum Error {
    /// Batch of configuration errors collected by a validation pass.
    #[error("{n} configuration error(s) found:\n{errors}", n = .0.len(), errors = .0)]
    Configuration(ValidationErrors),

    /// A single fatal configuration problem found outside validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Template registration or rendering failed.
    #[error("template `{name}` could not be rendered: {reason}")]
    Template {
        /// Template name or path
        name: String,
        /// Reason reported by the engine
        reason: String,
    },

    /// External command exited with a non-zero status.
    #[error("command `{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit code, `-1` when terminated by a signal or timeout
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// HTTP request answered with a non-success status.
    #[error("request `{request}` failed with status {status}: {body}")]
    RequestFailed {
        /// Method and URL, credentials masked
        request: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// HTTP transport failure.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem operation failed on a known path.
    #[error("error {context} `{}`: {error}", .path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: io::Error,
    },

    /// Generic packager failure.
    #[error("{0}")]
    ToolProcessing(String),

    /// Failure of a packager step, annotated with where it happened.
    #[error("[{packager}] {distribution}: {source}")]
    Packager {
        /// Distribution name
        distribution: String,
        /// Packager name
        packager: String,
        /// Wrapped failure
        #[source]
        source: Box<Error>,
    },

    /// Unclassified failure.
    #[error("{0}")]
    GenericError(String),

    /// Raw IO failure without further context.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// JSON serialization failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Invalid regular expression in the model.
    #[error("{0}")]
    Regex(#[from] regex::Error),

    /// Invalid glob pattern in an artifact path.
    #[error("{0}")]
    Glob(#[from] glob::PatternError),

    /// Zip archive could not be read.
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal failure.
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix stripping failure.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),
}

impl Error {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::InvalidConfig(_) | Error::Regex(_) | Error::Glob(_) => {
                ErrorKind::Configuration
            }
            Error::Template { .. }
            | Error::CommandFailed { .. }
            | Error::RequestFailed { .. }
            | Error::Http(_)
            | Error::Fs { .. }
            | Error::ToolProcessing(_)
            | Error::Json(_)
            | Error::Zip(_)
            | Error::WalkDir(_) => ErrorKind::ToolExecution,
            Error::Packager { source, .. } => source.kind(),
            Error::GenericError(_) | Error::IoError(_) | Error::StripPrefix(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    /// Creates a tool execution error from a message.
    pub fn tool(message: impl Into<String>) -> Self {
        Error::ToolProcessing(message.into())
    }

    /// Creates a single configuration error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Annotates this error with the distribution and packager being processed.
    pub fn in_packager(self, distribution: &str, packager: &str) -> Self {
        match self {
            already @ Error::Packager { .. } => already,
            other => Error::Packager {
                distribution: distribution.to_string(),
                packager: packager.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Extension for attaching path context to IO results.
pub trait ErrorExt<T> {
    /// Converts an IO error into [`Error::Fs`] carrying `context` and `path`.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Extension for turning missing values into errors.
pub trait Context<T> {
    /// Returns the value or an error carrying `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;

    /// Lazily computed variant of [`Context::context`].
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with a [`Error::ToolProcessing`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::release::Error::ToolProcessing(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::release::Error::ToolProcessing(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::config("x").kind(), ErrorKind::Configuration);
        assert_eq!(Error::tool("x").kind(), ErrorKind::ToolExecution);
        let io = Error::IoError(io::Error::other("disk"));
        assert_eq!(io.kind(), ErrorKind::Unexpected);

        let fs: Result<()> = Err(io::Error::other("denied")).fs_context("copying", "/tmp/a");
        assert_eq!(fs.unwrap_err().kind(), ErrorKind::ToolExecution);
    }

    #[test]
    fn packager_annotation_keeps_kind() {
        let err = Error::tool("boom").in_packager("app", "brew");
        assert_eq!(err.kind(), ErrorKind::ToolExecution);
        assert_eq!(err.to_string(), "[brew] app: boom");

        let twice = err.in_packager("other", "snap");
        assert_eq!(twice.to_string(), "[brew] app: boom");
    }

    #[test]
    fn collector_reports_every_error() {
        let mut errors = ValidationErrors::new();
        errors.configuration("first");
        errors.warning("only a warning");
        errors.configuration("second");
        assert_eq!(errors.len(), 2);

        let err = errors.into_result().unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("2 configuration error(s) found"));
        assert!(text.contains("  - first\n  - second"));
    }

    #[test]
    fn empty_collector_is_ok() {
        let mut errors = ValidationErrors::new();
        errors.warning("w");
        assert!(errors.into_result().is_ok());
    }
}
