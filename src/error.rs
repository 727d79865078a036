//! Error types for the fir command-line tool
//!
//! Invocation errors are detected before any side effect and reported with a
//! usage message. Everything else is a `FirError` raised by the registry or by
//! the default collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Errors in how the tool was invoked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// The command token matched no command or alias
    #[error("Could not find command \"{name}\".")]
    UnknownCommand { name: String },

    /// A flag that is not in the command's effective schema
    #[error("Unknown option {option} for command \"{command}\".")]
    UnknownOption { command: String, option: String },

    /// A required positional argument was not supplied
    #[error("\"{command}\" was called with no arguments\nUsage: \"{usage}\"")]
    MissingArgument { command: String, usage: String },

    /// Any other usage error reported by the option parser
    #[error("Invalid invocation of \"{command}\": {message}")]
    Usage { command: String, message: String },
}

impl InvocationError {
    /// Create an unknown command error
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Create an unknown option error
    pub fn unknown_option(command: impl Into<String>, option: impl Into<String>) -> Self {
        Self::UnknownOption {
            command: command.into(),
            option: option.into(),
        }
    }

    /// Create a missing argument error
    pub fn missing_argument(command: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::MissingArgument {
            command: command.into(),
            usage: usage.into(),
        }
    }

    /// Create a generic usage error
    pub fn usage(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Usage {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Main error type for the registry and the default collaborators
#[derive(Error, Debug)]
pub enum FirError {
    /// A command or option was declared inconsistently
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// File system operation errors
    #[error("File system error: {operation} failed on {path}")]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process execution errors
    #[error("Process error: {command} failed")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Errors related to building a package
    #[error("Build error: {message}")]
    Build { message: String },

    /// The remote distribution service cannot serve the request
    #[error("Remote service unavailable: {operation}")]
    Unavailable { operation: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl FirError {
    /// Create a new registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new process error
    pub fn process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a new build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a new remote-unavailable error
    pub fn unavailable(operation: impl Into<String>) -> Self {
        Self::Unavailable {
            operation: operation.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FirError>;
