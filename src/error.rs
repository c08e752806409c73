//! Error types for the command line front-end.
//!
//! Failures of the release core stay [`crate::release::Error`]s and are
//! wrapped here together with argument, IO and parsing failures.

use crate::release::ErrorKind;
use thiserror::Error;

/// Result type alias for front-end operations
pub type Result<T> = std::result::Result<T, PublishError>;

/// Main error type of the binary
#[derive(Error, Debug)]
pub enum PublishError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Release processing errors
    #[error("{0}")]
    Release(#[from] crate::release::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Conflicting arguments
    #[error("Conflicting arguments: {arguments:?}")]
    ConflictingArguments {
        /// Arguments that conflict
        arguments: Vec<String>,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl PublishError {
    /// Whether the failure comes from the release configuration rather than
    /// from running it.
    pub fn is_configuration(&self) -> bool {
        match self {
            PublishError::Toml(_) => true,
            PublishError::Release(e) => e.kind() == ErrorKind::Configuration,
            _ => false,
        }
    }

    /// Process exit code: 2 for configuration failures, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_configuration() { 2 } else { 1 }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PublishError::Toml(_) => vec!["Check the syntax of the release configuration".to_string()],
            PublishError::Release(e) => match e.kind() {
                ErrorKind::Configuration => vec![
                    "Fix the configuration errors listed above".to_string(),
                    "Run the `config` command to inspect the resolved model".to_string(),
                ],
                ErrorKind::ToolExecution => vec![
                    "Check that the packaging tools are installed and on PATH".to_string(),
                    "Set `continue_on_error` on packagers whose failures should not stop the release"
                        .to_string(),
                ],
                ErrorKind::Unexpected => {
                    vec!["Check file permissions and free space in the output directory".to_string()]
                }
            },
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::Error;

    #[test]
    fn configuration_failures_exit_with_two() {
        let err = PublishError::from(Error::config("distribution cli is not defined"));
        assert_eq!(err.exit_code(), 2);

        let err = PublishError::from(Error::tool("snapcraft failed"));
        assert_eq!(err.exit_code(), 1);

        let err = PublishError::from(CliError::MissingArgument {
            argument: "--config-file".into(),
        });
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn broken_toml_is_a_configuration_failure() {
        let err: PublishError = toml::from_str::<toml::Value>("[project").unwrap_err().into();
        assert!(err.is_configuration());
        assert_eq!(err.recovery_suggestions().len(), 1);
    }
}
