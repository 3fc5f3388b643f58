//! Concrete sources: literals, paths, open handles and borrowed readers.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use super::Source;
use crate::charset::Charset;

/// In-memory bytes. Replayable; every reader starts from the beginning.
///
/// # Example
///
/// ```rust
/// use brook::io::{BytesSource, Source};
/// use std::io::Read;
///
/// let source = BytesSource::from("abc");
/// assert_eq!(source.size_hint(), Some(3));
///
/// let mut out = Vec::new();
/// source.open().unwrap().read_to_end(&mut out).unwrap();
/// assert_eq!(out, b"abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesSource {
    bytes: Arc<[u8]>,
}

impl BytesSource {
    /// Creates a source over `bytes`.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        BytesSource {
            bytes: bytes.into(),
        }
    }

    /// Creates a source over `text` encoded in `charset`.
    pub fn text(text: &str, charset: Charset) -> Self {
        BytesSource::new(charset.encode(text))
    }

    /// The bytes this source produces.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for BytesSource {
    fn from(text: &str) -> Self {
        BytesSource::new(text.as_bytes())
    }
}

impl From<String> for BytesSource {
    fn from(text: String) -> Self {
        BytesSource::new(text.into_bytes())
    }
}

impl From<Vec<u8>> for BytesSource {
    fn from(bytes: Vec<u8>) -> Self {
        BytesSource::new(bytes)
    }
}

impl From<&[u8]> for BytesSource {
    fn from(bytes: &[u8]) -> Self {
        BytesSource::new(bytes)
    }
}

impl Source for BytesSource {
    type Reader = Cursor<Arc<[u8]>>;

    fn open(&self) -> io::Result<Self::Reader> {
        Ok(Cursor::new(Arc::clone(&self.bytes)))
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }
}

/// A file on disk, opened per read. Replayable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        PathSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for PathSource {
    type Reader = File;

    fn open(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    fn size_hint(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|meta| meta.len())
    }
}

/// An already-open file handle.
///
/// Readers share the handle's cursor, so the source is one-shot: a second
/// reader continues where the first one stopped.
#[derive(Debug)]
pub struct FileSource {
    file: File,
}

impl FileSource {
    /// Wraps an open file.
    pub fn new(file: File) -> Self {
        FileSource { file }
    }

    /// Returns the wrapped file.
    pub fn into_inner(self) -> File {
        self.file
    }
}

impl Source for FileSource {
    type Reader = File;

    fn open(&self) -> io::Result<File> {
        self.file.try_clone()
    }

    fn size_hint(&self) -> Option<u64> {
        self.file.metadata().ok().map(|meta| meta.len())
    }
}

/// A pre-existing reader, lent to every reader opened from this source.
///
/// One-shot: all readers pull from the same underlying reader.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: Rc<RefCell<R>>,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        ReaderSource {
            reader: Rc::new(RefCell::new(reader)),
        }
    }
}

impl<R: Read> Source for ReaderSource<R> {
    type Reader = SharedReader<R>;

    fn open(&self) -> io::Result<SharedReader<R>> {
        Ok(SharedReader {
            reader: Rc::clone(&self.reader),
        })
    }
}

/// Reader handed out by [`ReaderSource`].
#[derive(Debug)]
pub struct SharedReader<R> {
    reader: Rc<RefCell<R>>,
}

impl<R: Read> Read for SharedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = self
            .reader
            .try_borrow_mut()
            .map_err(|_| io::Error::new(io::ErrorKind::WouldBlock, "reader is already in use"))?;
        reader.read(buf)
    }
}
