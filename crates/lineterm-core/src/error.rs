//! Error types for the emulator engine.
//!
//! Every error here is recoverable: command-time errors are rendered as
//! [`OutputRecord::Error`](crate::OutputRecord::Error) records and never
//! abort the session. Only [`ConfigError`] is returned to the caller, at
//! startup.
//!
//! - [`FsError`] - virtual filesystem lookups and writes
//! - [`OptionError`] - malformed command-line options
//! - [`EnvironmentError`] - rejected variable assignments
//! - [`CommandError`] - everything a dispatch can fail with
//! - [`ConfigError`] - invalid startup configuration

use thiserror::Error;

/// Virtual filesystem errors. Each variant carries the offending path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("No such file or directory")]
    NotFound(String),
    #[error("Not a directory")]
    NotADirectory(String),
    #[error("Is a directory")]
    IsADirectory(String),
    #[error("File exists")]
    AlreadyExists(String),
    #[error("Directory not empty")]
    DirectoryNotEmpty(String),
    /// Writes that target the root itself (e.g. `rm -r /`).
    #[error("Invalid path")]
    InvalidPath(String),
}

impl FsError {
    /// The path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::IsADirectory(p)
            | Self::AlreadyExists(p)
            | Self::DirectoryNotEmpty(p)
            | Self::InvalidPath(p) => p,
        }
    }

    /// Same error, reported against `path` (usually what the user typed).
    pub fn with_path(self, path: impl Into<String>) -> Self {
        let path = path.into();
        match self {
            Self::NotFound(_) => Self::NotFound(path),
            Self::NotADirectory(_) => Self::NotADirectory(path),
            Self::IsADirectory(_) => Self::IsADirectory(path),
            Self::AlreadyExists(_) => Self::AlreadyExists(path),
            Self::DirectoryNotEmpty(_) => Self::DirectoryNotEmpty(path),
            Self::InvalidPath(_) => Self::InvalidPath(path),
        }
    }
}

/// A token sequence that does not satisfy a command's option schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unrecognized option '{0}'")]
    UnknownFlag(String),
    #[error("option '{0}' requires a value")]
    MissingValue(String),
    #[error("invalid number '{value}' for option '{flag}'")]
    InvalidNumber { flag: String, value: String },
    #[error("missing operand (expected at least {expected})")]
    MissingArgument { expected: usize },
    #[error("too many arguments (expected at most {expected})")]
    TooManyArguments { expected: usize },
}

/// A variable assignment the environment refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("'{0}': not a valid identifier")]
    InvalidName(String),
    /// `PWD` follows the working directory and cannot be assigned.
    #[error("'{0}': read-only variable")]
    ReadOnly(String),
}

/// Everything a single dispatch can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("command not found: {0}")]
    NotFound(String),
    #[error("{command}: {source}")]
    Options {
        command: String,
        #[source]
        source: OptionError,
    },
    /// Formats like coreutils: `cat: /nope: No such file or directory`.
    #[error("{command}: {path}: {source}", path = .source.path())]
    Fs {
        command: String,
        #[source]
        source: FsError,
    },
    #[error("{command}: {message}")]
    Failed { command: String, message: String },
}

impl CommandError {
    pub fn fs(command: &str, source: FsError) -> Self {
        Self::Fs {
            command: command.to_string(),
            source,
        }
    }

    pub fn failed(command: &str, message: impl Into<String>) -> Self {
        Self::Failed {
            command: command.to_string(),
            message: message.into(),
        }
    }
}

/// Invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("filesystem entry '{path}': {source}")]
    Filesystem {
        path: String,
        #[source]
        source: FsError,
    },
    #[error("filesystem path '{0}' must be absolute")]
    RelativePath(String),
    #[error("environment: {0}")]
    Environment(#[from] EnvironmentError),
}
