//! Error type for project generation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The destination directory is already present. Nothing was written.
    #[error("destination already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// An archive entry would land outside the extraction root.
    #[error("archive entry escapes the extraction root: {entry}")]
    UnsafeArchive { entry: String },

    /// Filesystem or archive I/O failed.
    #[error("project generation failed at {path}: {detail}")]
    Io { path: PathBuf, detail: String },
}

pub type Result<T> = std::result::Result<T, GenerateError>;
