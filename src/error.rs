//! Error types shared by every chainlift operation.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, LiftError>;

/// Every way a liftover session can fail.
#[derive(Debug, Error)]
pub enum LiftError {
    /// Rejected before any I/O or mapping took place.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A bundled or local chain file does not exist.
    #[error("chain file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Fetching a remote chain file failed.
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: DownloadFailure },

    /// The chain text is structurally invalid.
    #[error("malformed chain data at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// No chain met the match-fraction threshold.
    #[error("could not perform {from} to {to} liftover for {contig}:{start}-{end}")]
    LiftOverFailed {
        from: String,
        to: String,
        contig: String,
        start: u64,
        end: u64,
    },

    /// The external HGVS interpreter could not produce a usable batch.
    #[error("HGVS conversion failed: {0}")]
    Conversion(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chain index serialization failed: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Why a download did not produce a chain file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
    /// The server answered 404 or 410.
    #[error("resource not found (HTTP {0})")]
    NotFound(u16),
    /// Any other non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// Connection, DNS, TLS or timeout problems.
    #[error("transport error: {0}")]
    Transport(String),
    /// The payload could not be decoded (e.g. a broken gzip stream).
    #[error("corrupt payload: {0}")]
    Corrupt(String),
    /// The local cache artifact could not be written.
    #[error("could not write cache file: {0}")]
    Cache(String),
}

impl LiftError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LiftError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, msg: impl Into<String>) -> Self {
        LiftError::Parse {
            line,
            msg: msg.into(),
        }
    }

    /// True when a download failed because the remote resource is missing.
    pub fn is_remote_not_found(&self) -> bool {
        matches!(
            self,
            LiftError::Download {
                reason: DownloadFailure::NotFound(_),
                ..
            }
        )
    }
}
