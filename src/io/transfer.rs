//! The bounded-chunk copy loop every tee is built on.
//!
//! A [`Transfer`] reads up to one chunk from a reader, writes exactly the
//! bytes it got to a writer, and repeats until the reader reports end of
//! data with a zero-length read. Only one chunk is ever held in memory.
//!
//! A failing read or write aborts immediately. Bytes already written stay
//! written, and the returned [`TransferError`] records which side failed
//! and how many bytes had been moved.
//!
//! # Example
//!
//! ```rust
//! use brook::io::{ChunkSize, Transfer};
//!
//! let mut input: &[u8] = b"copy me in tiny pieces";
//! let mut output = Vec::new();
//!
//! let moved = Transfer::new()
//!     .with_chunk_size(ChunkSize::new(4).unwrap())
//!     .run(&mut input, &mut output)
//!     .unwrap();
//!
//! assert_eq!(moved, 22);
//! assert_eq!(output, b"copy me in tiny pieces");
//! ```

use std::fmt;
use std::io::{self, Read, Write};

use super::{Sink, Source};
use crate::error::{ConfigError, Side, TransferError};
use crate::scalar::Cancelled;

/// Number of bytes moved per read. Between 1 byte and [`ChunkSize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkSize(usize);

impl ChunkSize {
    /// 16 KiB.
    pub const DEFAULT: ChunkSize = ChunkSize(16 * 1024);

    /// 16 MiB. The whole chunk is allocated when a transfer starts.
    pub const MAX: ChunkSize = ChunkSize(16 * 1024 * 1024);

    /// Validates `size`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use brook::io::ChunkSize;
    ///
    /// assert_eq!(ChunkSize::new(512).unwrap().get(), 512);
    /// assert!(ChunkSize::new(0).is_err());
    /// assert!(ChunkSize::new(usize::MAX).is_err());
    /// ```
    pub fn new(size: usize) -> Result<ChunkSize, ConfigError> {
        if size == 0 || size > ChunkSize::MAX.0 {
            return Err(ConfigError::InvalidChunkSize { size });
        }
        Ok(ChunkSize(size))
    }

    /// The size in bytes.
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize::DEFAULT
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

impl TryFrom<usize> for ChunkSize {
    type Error = ConfigError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        ChunkSize::new(size)
    }
}

/// The transfer engine: a sequential, bounded-memory copy loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transfer {
    chunk: ChunkSize,
}

impl Transfer {
    /// A transfer with the default chunk size.
    pub fn new() -> Self {
        Transfer::default()
    }

    /// Uses `chunk` bytes per read.
    pub fn with_chunk_size(mut self, chunk: ChunkSize) -> Self {
        self.chunk = chunk;
        self
    }

    /// The configured chunk size.
    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk
    }

    /// Copies everything `reader` produces into `writer`.
    ///
    /// Returns the number of bytes moved. The writer is not flushed; use
    /// [`Transfer::between`] when the writer should be flushed and closed.
    ///
    /// Reads failing with [`io::ErrorKind::Interrupted`] are retried. A short
    /// read is not end of data; only a zero-length read is.
    ///
    /// A read failing with a [`Cancelled`] signal aborts the transfer and
    /// re-arms the signal's token.
    pub fn run<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<u64, TransferError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut buf = vec![0u8; self.chunk.get()];
        let mut moved: u64 = 0;

        loop {
            let read = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err)
                    if err.kind() == io::ErrorKind::Interrupted
                        && Cancelled::carried_by(&err).is_none() =>
                {
                    continue
                }
                Err(source) => {
                    if let Some(cancelled) = Cancelled::carried_by(&source) {
                        cancelled.restore();
                    }
                    return Err(aborted(Side::Read, moved, source));
                }
            };

            if let Err(source) = writer.write_all(&buf[..read]) {
                return Err(aborted(Side::Write, moved, source));
            }
            moved += read as u64;

            #[cfg(feature = "tracing")]
            tracing::trace!(chunk = read, moved, "chunk transferred");
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(moved, chunk_size = self.chunk.get(), "transfer complete");

        Ok(moved)
    }

    /// Opens `source` and `sink`, copies, and flushes the sink.
    ///
    /// Both the reader and the writer are dropped before this returns,
    /// whether the transfer succeeded or not.
    pub fn between<S, K>(&self, source: &S, sink: &K) -> Result<u64, TransferError>
    where
        S: Source + ?Sized,
        K: Sink + ?Sized,
    {
        let mut reader = source.open().map_err(|source| TransferError::Open {
            side: Side::Read,
            source,
        })?;
        let mut writer = sink.open().map_err(|source| TransferError::Open {
            side: Side::Write,
            source,
        })?;

        let moved = self.run(&mut reader, &mut writer)?;
        writer
            .flush()
            .map_err(|source| aborted(Side::Write, moved, source))?;
        Ok(moved)
    }
}

/// Copies `reader` into `writer` with the default chunk size.
pub fn transfer<R, W>(reader: &mut R, writer: &mut W) -> Result<u64, TransferError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    Transfer::new().run(reader, writer)
}

pub(crate) fn aborted(side: Side, moved: u64, source: io::Error) -> TransferError {
    #[cfg(feature = "tracing")]
    tracing::warn!(%side, moved, error = %source, "transfer aborted");

    match side {
        Side::Read => TransferError::Read { moved, source },
        Side::Write => TransferError::Write { moved, source },
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::ChunkSize;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for ChunkSize {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_u64(self.0 as u64)
        }
    }

    impl<'de> Deserialize<'de> for ChunkSize {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let size = usize::deserialize(deserializer)?;
            ChunkSize::new(size).map_err(serde::de::Error::custom)
        }
    }
}
