//! Error types for transfers and configuration.
//!
//! Transport failures are never swallowed: every [`TransferError`] keeps the
//! underlying [`std::io::Error`] reachable through `source()`, together with
//! the number of bytes that had already been moved when the transfer aborted.

use std::fmt;
use std::io;

use thiserror::Error;

/// Which end of a transfer an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The source being read.
    Read,
    /// The sink being written.
    Write,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Read => write!(f, "source"),
            Side::Write => write!(f, "sink"),
        }
    }
}

/// Failure of the transfer engine.
///
/// Bytes written before the failure stay written; there is no rollback.
#[derive(Error, Debug)]
pub enum TransferError {
    /// A capability could not be opened.
    #[error("failed to open {side}: {source}")]
    Open {
        /// The end that failed to open.
        side: Side,
        /// The transport failure.
        #[source]
        source: io::Error,
    },

    /// Reading from the source failed.
    #[error("read failed after {moved} bytes: {source}")]
    Read {
        /// Bytes already delivered to the sink.
        moved: u64,
        /// The transport failure.
        #[source]
        source: io::Error,
    },

    /// Writing to (or flushing) the sink failed.
    #[error("write failed after {moved} bytes: {source}")]
    Write {
        /// Bytes already delivered to the sink before the failing write.
        moved: u64,
        /// The transport failure.
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    /// Returns which end of the transfer failed.
    pub fn side(&self) -> Side {
        match self {
            TransferError::Open { side, .. } => *side,
            TransferError::Read { .. } => Side::Read,
            TransferError::Write { .. } => Side::Write,
        }
    }

    /// Returns the number of bytes moved before the failure.
    ///
    /// Always zero for [`TransferError::Open`].
    pub fn moved(&self) -> u64 {
        match self {
            TransferError::Open { .. } => 0,
            TransferError::Read { moved, .. } | TransferError::Write { moved, .. } => *moved,
        }
    }

    /// Returns the underlying transport failure.
    pub fn io_error(&self) -> &io::Error {
        match self {
            TransferError::Open { source, .. }
            | TransferError::Read { source, .. }
            | TransferError::Write { source, .. } => source,
        }
    }

    /// Consumes the error and returns the underlying transport failure.
    pub fn into_io_error(self) -> io::Error {
        match self {
            TransferError::Open { source, .. }
            | TransferError::Read { source, .. }
            | TransferError::Write { source, .. } => source,
        }
    }
}

impl From<TransferError> for io::Error {
    fn from(err: TransferError) -> Self {
        let kind = err.io_error().kind();
        io::Error::new(kind, err)
    }
}

/// Invalid configuration, raised when a wrapper is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The charset name is unknown or not supported.
    #[error("unsupported charset: {name}")]
    UnsupportedCharset {
        /// The name that was looked up.
        name: String,
    },

    /// Chunk sizes must be positive and at most `ChunkSize::MAX`.
    #[error("invalid chunk size: {size} (must be between 1 and 16 MiB)")]
    InvalidChunkSize {
        /// The rejected size.
        size: usize,
    },
}
