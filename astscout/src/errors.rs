//! Error types for astscout.
//!
//! Errors fall in two groups with very different treatment:
//!
//! 1. **Configuration errors** (`InvalidPattern`, `ConfigError`, `Language`)
//!    are fatal. They are raised before any file is touched and the CLI exits
//!    with a non-zero status.
//!
//! 2. **Per-file errors** (`FileNotFound`, `PermissionDenied`, `IoError`,
//!    `EncodingError`, `Parse`) are recoverable. The parse stage logs them and
//!    leaves the offending file out of the stream; they never reach a matcher.
//!
//! ```rust,ignore
//! match parser.parse_file(&fset, path) {
//!     Ok(file) => files.push(file),
//!     Err(SearchError::Parse { path, line, column }) => warn!(...),
//!     Err(e) => warn!("{}", e),
//! }
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while configuring or running a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("{}:{line}:{column}: syntax error", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
    },
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[error("Language error: {0}")]
    Language(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            column,
        }
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::string::FromUtf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an I/O error raised while reading `path` to the most specific variant.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }

    /// True for errors that abort a run before any file is searched.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. } | Self::ConfigError(_) | Self::Language(_)
        )
    }
}
