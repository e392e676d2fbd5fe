//! Error types for append operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while processing an append request
#[derive(Error, Debug)]
pub enum AppendError {
    /// The request is missing something the user has to supply
    #[error("{0}")]
    Validation(String),

    /// IO error while staging, extracting or packing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable ZIP archive
    #[error("Invalid ZIP archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Archive entry is password-protected
    #[error("Archive entry '{0}' is password-protected")]
    PasswordProtected(String),

    /// A PDF could not be opened or rendered
    #[error("Failed to render PDF {}: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },

    /// A Word document supplied as append content could not be read
    #[error("Failed to read Word document {}: {reason}", path.display())]
    SourceDocument { path: PathBuf, reason: String },

    /// A target document could not be written back
    #[error("Failed to save {}: {reason}", path.display())]
    Save { path: PathBuf, reason: String },
}

impl AppendError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppendError::Validation(message.into())
    }

    /// Whether the error describes bad user input rather than a processing failure
    pub fn is_validation(&self) -> bool {
        matches!(self, AppendError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, AppendError>;
