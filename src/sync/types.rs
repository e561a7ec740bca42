//! Sync types shared by the manifest, delta and executor stages.

use std::path::PathBuf;

/// Sync-specific errors.
///
/// Every variant is fatal for the run: the pipeline never retries and never
/// continues past a failed file.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error on a local path.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path being read, written or removed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Transport-level HTTP failure (DNS, connect, TLS, body read).
    #[error("Request to {url} failed: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be built.
    #[error("Failed to initialize HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A remote stream failed part way through.
    #[error("Failed to read {url}: {source}")]
    Read {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Response status.
        status: reqwest::StatusCode,
    },

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        /// Offending input.
        url: String,
        /// Underlying error.
        #[source]
        source: url::ParseError,
    },

    /// The transport does not know how to open this scheme.
    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme {
        /// Scheme of the URL.
        scheme: String,
        /// Full URL.
        url: String,
    },

    /// A manifest key that would escape the instance directory.
    #[error("Refusing unsafe manifest path '{0}'")]
    UnsafePath(String),
}

impl SyncError {
    /// Attach a path to an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Counts of the decisions taken in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Local files removed because the remote no longer lists them.
    pub removed: usize,
    /// Files downloaded because they were missing or outdated.
    pub updated: usize,
    /// Files whose recorded hash already matched the remote.
    pub up_to_date: usize,
}

impl SyncStats {
    /// Whether the run touched any file.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.removed == 0 && self.updated == 0
    }
}
