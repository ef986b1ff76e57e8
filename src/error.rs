use std::io;
use thiserror::Error;

/// An error produced by a virtual filesystem operation.
#[derive(Debug, Error)]
pub enum VfsError {
    /// No mount serves the path, or the backend reports the target absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A lower-level I/O failure. Fatal to the call that observed it.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend structurally cannot perform the operation.
    #[error("operation not supported")]
    NotSupported,

    /// The virtual path is rooted or contains a traversal segment.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A mount manifest could not be parsed.
    #[error("invalid mount manifest: {0}")]
    Config(#[from] ron::error::SpannedError),
}

impl VfsError {
    /// Creates a `NotFound` error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Creates an `InvalidPath` error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Returns true if this is a decisive I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// The result of a virtual filesystem operation.
pub type Result<T> = std::result::Result<T, VfsError>;
