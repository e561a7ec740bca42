//! Error types for the updater.
//!
//! Provides structured error handling with:
//! - Error categories (`ErrorCode`)
//! - Category-based exit codes (1=usage, 4=argument, 8=I/O)
//! - Recovery hints for the common failure modes

use thiserror::Error;

use crate::sync::SyncError;

/// Result type alias for updater operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Usage line printed for a wrong argument count.
pub const USAGE: &str = "Usage: mmc-pack-updater <instance path> <url to modpack>";

// ── Error Code ────────────────────────────────────────────────

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Wrong number of arguments (exit 1).
    UsageError,
    /// An argument was present but unusable (exit 4).
    InvalidArgument,
    /// Any local or remote I/O failure (exit 8).
    IoError,
}

impl ErrorCode {
    /// Category-based process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::UsageError => 1,
            Self::InvalidArgument => 4,
            Self::IoError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that abort an updater run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Usage(_) => ErrorCode::UsageError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Sync(_) => ErrorCode::IoError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Recovery hint for the user.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidArgument(_) => Some(
                "Pass the modpack base URL, e.g. https://example.com/packs/my-pack".to_string(),
            ),

            Self::Sync(SyncError::HttpStatus { status, .. })
                if *status == reqwest::StatusCode::NOT_FOUND =>
            {
                Some(
                    "The file is not published. Check that the modpack URL is correct \
                     and that `<url>-instance/` exists on the server."
                        .to_string(),
                )
            }

            Self::Sync(SyncError::UnsafePath(_)) => Some(
                "The remote manifest lists a path outside the instance directory; \
                 ask the modpack maintainer to fix it."
                    .to_string(),
            ),

            Self::Sync(SyncError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                Some("Close the game and launcher, then check file permissions.".to_string())
            }

            Self::Usage(_) | Self::Sync(_) => None,
        }
    }
}
