//! Tee wrappers: duplicate a stream into a second destination.
//!
//! - [`TeeSource`] wraps a source and a sink. Opening it copies the whole
//!   upstream content into the sink, then hands the caller a reader over
//!   the very same bytes.
//! - [`TeeSink`] wraps two sinks and forwards every write to both.
//!
//! Neither wrapper alters what the primary consumer observes.

use std::io::{self, Cursor, Write};

use super::transfer::{aborted, ChunkSize, Transfer};
use super::{Sink, Source};
use crate::charset::{Charset, Transcoder};
use crate::error::{ConfigError, Side, TransferError};

/// Upper bound on memory reserved up front from a size hint.
const MAX_PREALLOC: u64 = 1024 * 1024;

/// A source that mirrors its upstream into a sink.
///
/// Every [`Source::open`] copies the complete upstream content into the
/// sink exactly once before returning, so the mirror is durable by the
/// time the caller reads anything. The caller's reader yields the upstream
/// bytes unchanged.
///
/// When the sink is a character sink ([`Sink::charset`] returns `Some`),
/// the upstream bytes are decoded with this tee's charset (UTF-8 unless
/// configured) and re-encoded in the sink's charset. Byte sinks receive the
/// upstream bytes verbatim and the charset is not used.
///
/// # Example
///
/// ```rust
/// use brook::io::{BytesSource, Source, TeeSource, TextSink, WriterSink};
/// use brook::charset::Charset;
/// use std::io::Read;
///
/// let mirror = TextSink::new(WriterSink::new(Vec::new())).with_charset(Charset::Utf16Be);
/// let tee = TeeSource::new(BytesSource::from("ok"), &mirror).with_size(1);
///
/// let mut seen = String::new();
/// tee.open().unwrap().read_to_string(&mut seen).unwrap();
///
/// assert_eq!(seen, "ok");
/// assert_eq!(mirror.get_ref().borrow().as_slice(), &[0, b'o', 0, b'k']);
/// ```
#[derive(Debug, Clone)]
pub struct TeeSource<S, K> {
    upstream: S,
    sink: K,
    size: Option<u64>,
    charset: Option<Charset>,
    transfer: Transfer,
}

impl<S: Source, K: Sink> TeeSource<S, K> {
    /// Mirrors `upstream` into `sink`.
    pub fn new(upstream: S, sink: K) -> Self {
        TeeSource {
            upstream,
            sink,
            size: None,
            charset: None,
            transfer: Transfer::new(),
        }
    }

    /// Declares the expected content size. Advisory only.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Decodes upstream bytes with `charset` when the sink stores text.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Like [`TeeSource::with_charset`], looking the charset up by name.
    pub fn with_charset_name(self, name: &str) -> Result<Self, ConfigError> {
        Ok(self.with_charset(Charset::for_name(name)?))
    }

    /// Copies with `chunk` bytes per read.
    pub fn with_chunk_size(mut self, chunk: ChunkSize) -> Self {
        self.transfer = self.transfer.with_chunk_size(chunk);
        self
    }

    /// The charset upstream bytes are decoded with.
    pub fn charset(&self) -> Charset {
        self.charset.unwrap_or_default()
    }

    /// Copies the upstream into the sink and returns the upstream content.
    pub fn mirror(&self) -> Result<Vec<u8>, TransferError> {
        let mut reader = self.upstream.open().map_err(|source| TransferError::Open {
            side: Side::Read,
            source,
        })?;
        let writer = self.sink.open().map_err(|source| TransferError::Open {
            side: Side::Write,
            source,
        })?;

        let writer = match self.sink.charset() {
            Some(target) => Mirror::Transcoded(Transcoder::new(writer, self.charset(), target)),
            None => Mirror::Raw(writer),
        };
        let mut tee = TeeWriter::new(Vec::with_capacity(self.capacity()), writer);

        let moved = self.transfer.run(&mut reader, &mut tee)?;
        let (view, mirror) = tee.into_inner();
        mirror
            .finish()
            .map_err(|source| aborted(Side::Write, moved, source))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(moved, hint = ?self.size_hint(), "tee mirror complete");

        Ok(view)
    }

    fn capacity(&self) -> usize {
        self.size_hint()
            .map_or(0, |hint| usize::try_from(hint.min(MAX_PREALLOC)).unwrap_or(0))
    }
}

impl<S: Source, K: Sink> Source for TeeSource<S, K> {
    type Reader = Cursor<Vec<u8>>;

    fn open(&self) -> io::Result<Cursor<Vec<u8>>> {
        Ok(Cursor::new(self.mirror()?))
    }

    fn size_hint(&self) -> Option<u64> {
        self.size.or_else(|| self.upstream.size_hint())
    }
}

/// The sink side of a [`TeeSource`].
enum Mirror<W> {
    Raw(W),
    Transcoded(Transcoder<W>),
}

impl<W: Write> Mirror<W> {
    fn finish(self) -> io::Result<()> {
        match self {
            Mirror::Raw(mut writer) => writer.flush(),
            Mirror::Transcoded(transcoder) => transcoder.finish().map(drop),
        }
    }
}

impl<W: Write> Write for Mirror<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Mirror::Raw(writer) => writer.write(buf),
            Mirror::Transcoded(transcoder) => transcoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Mirror::Raw(writer) => writer.flush(),
            Mirror::Transcoded(transcoder) => transcoder.flush(),
        }
    }
}

/// A sink that forwards every write to two sinks.
///
/// The tee reports the primary's charset.
#[derive(Debug, Clone)]
pub struct TeeSink<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Sink, B: Sink> TeeSink<A, B> {
    /// Forwards writes to `primary`, then `secondary`.
    pub fn new(primary: A, secondary: B) -> Self {
        TeeSink { primary, secondary }
    }

    /// Returns both sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.primary, self.secondary)
    }
}

impl<A: Sink, B: Sink> Sink for TeeSink<A, B> {
    type Writer = TeeWriter<A::Writer, B::Writer>;

    fn open(&self) -> io::Result<Self::Writer> {
        Ok(TeeWriter::new(self.primary.open()?, self.secondary.open()?))
    }

    fn charset(&self) -> Option<Charset> {
        self.primary.charset()
    }
}

/// A writer that duplicates every buffer into two writers.
///
/// Each buffer is written completely to the primary and then to the
/// secondary. The first failure is returned as is; whatever either writer
/// already accepted stays written.
#[derive(Debug)]
pub struct TeeWriter<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    /// Duplicates writes into `primary` and `secondary`.
    pub fn new(primary: A, secondary: B) -> Self {
        TeeWriter { primary, secondary }
    }

    /// The primary writer.
    pub fn primary(&self) -> &A {
        &self.primary
    }

    /// The secondary writer.
    pub fn secondary(&self) -> &B {
        &self.secondary
    }

    /// Returns both writers without flushing them.
    pub fn into_inner(self) -> (A, B) {
        (self.primary, self.secondary)
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}
