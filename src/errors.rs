//! Typed error definitions for smart_rm.
//! The first four variants are the per-path taxonomy the batch remover records;
//! everything else propagates to the caller.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fs_ops::describe_io_error;

#[derive(Debug, Error)]
pub enum SmartRmError {
    #[error("Directory not empty: {0}")]
    NotEmpty(PathBuf),

    #[error("Wrong kind of entry at {path}: expected {expected}")]
    WrongKind { path: PathBuf, expected: &'static str },

    #[error("Permission denied on {path}: {context}")]
    PermissionDenied { path: PathBuf, context: String },

    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),

    #[error("{op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SmartRmError {
    /// Map an io::Error onto the taxonomy where the kind allows it.
    pub fn from_io(op: &'static str, path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => SmartRmError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => SmartRmError::PermissionDenied {
                path: path.to_path_buf(),
                context: describe_io_error(op, path, &e),
            },
            io::ErrorKind::DirectoryNotEmpty => SmartRmError::NotEmpty(path.to_path_buf()),
            _ => SmartRmError::Io {
                op,
                path: path.to_path_buf(),
                source: e,
            },
        }
    }

    /// Closure form for `.map_err(...)`.
    pub fn io_with<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |e| Self::from_io(op, path, e)
    }

    /// True for failures that belong to a single input path and must not abort a batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SmartRmError::NotEmpty(_)
                | SmartRmError::WrongKind { .. }
                | SmartRmError::PermissionDenied { .. }
                | SmartRmError::NotFound(_)
        )
    }

    /// Stable numeric code for logs.
    pub fn code(&self) -> u8 {
        match self {
            SmartRmError::NotEmpty(_) => 10,
            SmartRmError::WrongKind { .. } => 11,
            SmartRmError::PermissionDenied { .. } => 12,
            SmartRmError::NotFound(_) => 13,
            SmartRmError::Io { .. } => 20,
            SmartRmError::Config(_) => 21,
        }
    }

    /// Short machine-friendly name used as the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SmartRmError::NotEmpty(_) => "not_empty",
            SmartRmError::WrongKind { .. } => "wrong_kind",
            SmartRmError::PermissionDenied { .. } => "permission_denied",
            SmartRmError::NotFound(_) => "not_found",
            SmartRmError::Io { .. } => "io",
            SmartRmError::Config(_) => "config",
        }
    }

    /// The path the failure is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SmartRmError::NotEmpty(p) | SmartRmError::NotFound(p) => Some(p),
            SmartRmError::WrongKind { path, .. }
            | SmartRmError::PermissionDenied { path, .. }
            | SmartRmError::Io { path, .. } => Some(path),
            SmartRmError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SmartRmError>;
