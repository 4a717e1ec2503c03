//! Error types for the lint command

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a lint run before any findings are reported
#[derive(Debug, Error)]
pub enum LintError {
    /// Failed to read or parse a configuration file
    #[error("Failed to load config from {path}: {message}")]
    ConfigLoad {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Failed to read or decode an input document
    #[error("Failed to load document {path}: {message}")]
    DocumentLoad {
        /// Path to the document
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// The configured custom validator does not exist
    #[error("Custom validator {0} not found")]
    CustomValidatorNotFound(PathBuf),

    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
