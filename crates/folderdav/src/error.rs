//! Error handling for resource operations.
//!
//! Every filesystem failure inside a resource is reported as a single
//! [`FolderDavError::Io`] carrying an [`OpContext`]. The protocol layer
//! classifies it with [`FolderDavError::category`] and turns the resulting
//! [`ErrorCategory`] into a status code.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Context for a failed operation, used in error messages.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    /// Short operation name (`"copy"`, `"list"`, ...).
    pub operation: Option<&'static str>,
    /// The filesystem path the operation was acting on.
    pub path: Option<PathBuf>,
    /// Destination path for copy and move.
    pub destination: Option<PathBuf>,
}

impl OpContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}

impl fmt::Display for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(op) = self.operation {
            parts.push(op.to_string());
        }
        if let Some(path) = &self.path {
            parts.push(format!("of '{}'", path.display()));
        }
        if let Some(dest) = &self.destination {
            parts.push(format!("to '{}'", dest.display()));
        }
        if parts.is_empty() {
            write!(f, "(no context)")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

/// Errors produced by the resource layer.
#[derive(Debug, Error)]
pub enum FolderDavError {
    /// Unrecoverable filesystem failure.
    #[error("IO error during {context}: {source}")]
    Io {
        #[source]
        source: io::Error,
        context: Box<OpContext>,
    },

    /// A path or name that cannot be addressed below the root.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Invalid root directory or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FolderDavError {
    pub(crate) fn io(source: io::Error, context: OpContext) -> Self {
        FolderDavError::Io {
            source,
            context: Box::new(context),
        }
    }

    pub(crate) fn invalid_path(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        FolderDavError::InvalidPath {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Classify this error for translation into a protocol status.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FolderDavError::Io { source, .. } => ErrorCategory::from(source),
            FolderDavError::InvalidPath { .. } => ErrorCategory::InvalidArgument,
            FolderDavError::Config(_) => ErrorCategory::IoError,
        }
    }
}

/// Result type for resource operations.
pub type FolderDavResult<T> = Result<T, FolderDavError>;

/// Backend-neutral classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    AlreadyExists,
    NotEmpty,
    PermissionDenied,
    InvalidArgument,
    IoError,
}

impl ErrorCategory {
    /// Conventional HTTP status code for this category.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCategory::NotFound => 404,
            ErrorCategory::AlreadyExists | ErrorCategory::NotEmpty => 409,
            ErrorCategory::PermissionDenied => 403,
            ErrorCategory::InvalidArgument => 400,
            ErrorCategory::IoError => 500,
        }
    }
}

impl From<&io::Error> for ErrorCategory {
    fn from(e: &io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => ErrorCategory::NotFound,
            io::ErrorKind::AlreadyExists => ErrorCategory::AlreadyExists,
            io::ErrorKind::DirectoryNotEmpty => ErrorCategory::NotEmpty,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                ErrorCategory::PermissionDenied
            }
            io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidFilename
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::IsADirectory => ErrorCategory::InvalidArgument,
            _ => ErrorCategory::IoError,
        }
    }
}
