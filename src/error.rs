//! Centralized error handling for mddoc
//!
//! This module provides a unified error type that covers all error scenarios
//! in the application: configuration, source path resolution, parsing,
//! generation and file I/O.

use crate::generator::GenerateError;
use crate::markdown::ParseError;
use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/TOML)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    /// The parser selector names no known parser
    UnknownParser(String),

    /// The generator selector names no known generator
    UnknownGenerator(String),

    /// An input path spec could not be resolved
    SourcePath { spec: String, reason: String },

    /// The selected generator has no result file configured
    MissingResultFile { generator: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A source document could not be parsed
    Parse { file: PathBuf, source: ParseError },

    /// I/O failure while reading input
    ParseIo { file: PathBuf, source: io::Error },

    /// The generator reported a failure
    Generate(GenerateError),

    /// I/O failure while writing output
    GenerateIo { path: PathBuf, source: io::Error },
}

impl Error {
    /// Whether this error stems from bad configuration rather than from
    /// running the pipeline.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigLoad { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigDirNotFound
                | Error::UnknownParser(_)
                | Error::UnknownGenerator(_)
                | Error::SourcePath { .. }
                | Error::MissingResultFile { .. }
        )
    }

    /// Render the error with its full `source()` chain, one cause per line.
    pub fn chain(&self) -> String {
        use std::error::Error as StdError;

        let mut out = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            out.push_str("\n  caused by: ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<GenerateError> for Error {
    fn from(err: GenerateError) -> Self {
        Error::Generate(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // File I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }
            Error::UnknownParser(name) => write!(f, "Unknown parser specified: '{}'", name),
            Error::UnknownGenerator(name) => write!(f, "Unknown generator: '{}'", name),
            Error::SourcePath { spec, reason } => {
                write!(f, "Bad input path '{}': {}", spec, reason)
            }
            Error::MissingResultFile { generator } => {
                write!(f, "No result file configured for the {} generator", generator)
            }

            // Pipeline Errors
            Error::Parse { file, .. } => write!(f, "Parse failure in '{}'", file.display()),
            Error::ParseIo { file, .. } => {
                write!(f, "I/O failure while parsing input '{}'", file.display())
            }
            Error::Generate(_) => write!(f, "Generate failure"),
            Error::GenerateIo { path, .. } => {
                write!(f, "I/O failure while generating '{}'", path.display())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::Parse { source, .. } => Some(source),
            Error::ParseIo { source, .. } => Some(source),
            Error::Generate(err) => Some(err),
            Error::GenerateIo { source, .. } => Some(source),
            Error::ConfigDirNotFound
            | Error::UnknownParser(_)
            | Error::UnknownGenerator(_)
            | Error::SourcePath { .. }
            | Error::MissingResultFile { .. } => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
