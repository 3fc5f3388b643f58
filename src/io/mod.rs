//! Byte sources, byte sinks, and the transfers between them.
//!
//! This module is built on two capability traits:
//!
//! - [`Source`] - "open a reader over some bytes, on demand"
//! - [`Sink`] - "open a writer that stores or forwards bytes, on demand"
//!
//! Neither trait holds data. A capability is opened once per use, the
//! returned reader or writer belongs to that use alone, and it is dropped
//! (closing any file it holds) on every exit path, including failure.
//!
//! Wrappers compose by owning the capability they wrap:
//!
//! ```rust
//! use brook::io::{BytesSource, Source, TeeSource, WriterSink};
//! use std::io::Read;
//!
//! let mirror = WriterSink::new(Vec::new());
//! let tee = TeeSource::new(BytesSource::from("Hello, товарищ"), &mirror);
//!
//! let mut seen = String::new();
//! tee.open().unwrap().read_to_string(&mut seen).unwrap();
//!
//! assert_eq!(seen, "Hello, товарищ");
//! assert_eq!(mirror.borrow().as_slice(), "Hello, товарищ".as_bytes());
//! ```
//!
//! Capabilities are also implemented for shared references, so a caller can
//! lend one to a wrapper and keep inspecting it afterwards.

mod sink;
mod source;
mod tee;
mod transfer;

use std::io::{self, Read, Write};

use crate::charset::Charset;

pub use sink::{FileSink, PathSink, SharedWriter, TextSink, WriterSink};
pub use source::{BytesSource, FileSource, PathSource, ReaderSource, SharedReader};
pub use tee::{TeeSink, TeeSource, TeeWriter};
pub use transfer::{transfer, ChunkSize, Transfer};

/// Something that can produce a stream of bytes when asked.
///
/// Each call to [`Source::open`] is independent. Replayable sources (an
/// in-memory literal, a path) return the full content every time; one-shot
/// sources (an already-open handle, a borrowed reader) continue from
/// wherever the previous reader stopped.
pub trait Source {
    /// The reader produced by [`Source::open`].
    type Reader: Read;

    /// Opens a fresh reader.
    fn open(&self) -> io::Result<Self::Reader>;

    /// Advisory size of the content in bytes.
    ///
    /// Used only to pre-size buffers. Transfers always run until the reader
    /// is exhausted, whatever this returns.
    fn size_hint(&self) -> Option<u64> {
        None
    }
}

impl<S: Source + ?Sized> Source for &S {
    type Reader = S::Reader;

    fn open(&self) -> io::Result<Self::Reader> {
        (**self).open()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

/// Something that can accept a stream of bytes when asked.
pub trait Sink {
    /// The writer produced by [`Sink::open`].
    type Writer: Write;

    /// Opens a fresh writer.
    fn open(&self) -> io::Result<Self::Writer>;

    /// The charset this sink stores text in.
    ///
    /// `None` marks a byte sink, which receives bytes verbatim. Character
    /// sinks return the charset their content is encoded in; wrappers that
    /// feed them text re-encode into it.
    fn charset(&self) -> Option<Charset> {
        None
    }
}

impl<K: Sink + ?Sized> Sink for &K {
    type Writer = K::Writer;

    fn open(&self) -> io::Result<Self::Writer> {
        (**self).open()
    }

    fn charset(&self) -> Option<Charset> {
        (**self).charset()
    }
}
