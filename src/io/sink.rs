//! Concrete sinks: paths, open handles, borrowed writers and text sinks.

use std::cell::{Ref, RefCell};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::Sink;
use crate::charset::Charset;
use crate::error::ConfigError;

/// A file on disk, created (or truncated) every time it is opened.
///
/// The file handle lives only as long as the writer returned by
/// [`Sink::open`], so it is closed on every exit path of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSink {
    path: PathBuf,
    append: bool,
}

impl PathSink {
    /// Creates a sink that truncates `path` on open.
    pub fn new(path: impl AsRef<Path>) -> Self {
        PathSink {
            path: path.as_ref().to_path_buf(),
            append: false,
        }
    }

    /// Appends to the file instead of truncating it.
    pub fn appending(mut self) -> Self {
        self.append = true;
        self
    }

    /// The path this sink writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for PathSink {
    type Writer = File;

    fn open(&self) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true);
        if self.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        options.open(&self.path)
    }
}

/// An already-open file handle. Writers share the handle's cursor.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Wraps an open file.
    pub fn new(file: File) -> Self {
        FileSink { file }
    }

    /// Returns the wrapped file.
    pub fn into_inner(self) -> File {
        self.file
    }
}

impl Sink for FileSink {
    type Writer = File;

    fn open(&self) -> io::Result<File> {
        self.file.try_clone()
    }
}

/// A pre-existing writer, lent to every writer opened from this sink.
///
/// Useful for in-memory targets: wrap a `Vec<u8>`, hand `&sink` to a
/// wrapper, then inspect the bytes with [`WriterSink::borrow`].
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Rc<RefCell<W>>,
}

impl<W: Write> WriterSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer: Rc::new(RefCell::new(writer)),
        }
    }

    /// Borrows the wrapped writer.
    ///
    /// # Panics
    ///
    /// Panics if a write through this sink is in progress.
    pub fn borrow(&self) -> Ref<'_, W> {
        self.writer.borrow()
    }

    /// Returns the wrapped writer, or `self` while writers are still open.
    pub fn into_inner(self) -> Result<W, Self> {
        Rc::try_unwrap(self.writer)
            .map(RefCell::into_inner)
            .map_err(|writer| WriterSink { writer })
    }
}

impl<W: Write> Sink for WriterSink<W> {
    type Writer = SharedWriter<W>;

    fn open(&self) -> io::Result<SharedWriter<W>> {
        Ok(SharedWriter {
            writer: Rc::clone(&self.writer),
        })
    }
}

/// Writer handed out by [`WriterSink`].
#[derive(Debug)]
pub struct SharedWriter<W> {
    writer: Rc<RefCell<W>>,
}

impl<W: Write> SharedWriter<W> {
    fn lease(&self) -> io::Result<std::cell::RefMut<'_, W>> {
        self.writer
            .try_borrow_mut()
            .map_err(|_| io::Error::new(io::ErrorKind::WouldBlock, "writer is already in use"))
    }
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lease()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lease()?.flush()
    }
}

/// Marks a sink as storing text in a given charset (UTF-8 by default).
///
/// Wrappers that feed text into a `TextSink` re-encode it into this
/// charset; the inner sink still receives plain bytes.
///
/// # Example
///
/// ```rust
/// use brook::charset::Charset;
/// use brook::io::{Sink, TextSink, WriterSink};
///
/// let sink = TextSink::new(WriterSink::new(Vec::new()))
///     .with_charset_name("ISO-8859-1")
///     .unwrap();
/// assert_eq!(sink.charset(), Some(Charset::Latin1));
///
/// assert!(TextSink::new(WriterSink::new(Vec::new()))
///     .with_charset_name("no-such-charset")
///     .is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSink<K> {
    inner: K,
    charset: Charset,
}

impl<K: Sink> TextSink<K> {
    /// Wraps `inner` as a UTF-8 text sink.
    pub fn new(inner: K) -> Self {
        TextSink {
            inner,
            charset: Charset::default(),
        }
    }

    /// Stores text in `charset`.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Stores text in the charset called `name`.
    pub fn with_charset_name(self, name: &str) -> Result<Self, ConfigError> {
        Ok(self.with_charset(Charset::for_name(name)?))
    }

    /// The wrapped sink.
    pub fn get_ref(&self) -> &K {
        &self.inner
    }

    /// Returns the wrapped sink.
    pub fn into_inner(self) -> K {
        self.inner
    }
}

impl<K: Sink> Sink for TextSink<K> {
    type Writer = K::Writer;

    fn open(&self) -> io::Result<K::Writer> {
        self.inner.open()
    }

    fn charset(&self) -> Option<Charset> {
        Some(self.charset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Seek, SeekFrom};

    #[test]
    fn test_path_sink_truncates_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "previous content").unwrap();

        let sink = PathSink::new(&path);
        sink.open().unwrap().write_all(b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_path_sink_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        let sink = PathSink::new(&path).appending();
        sink.open().unwrap().write_all(b"one ").unwrap();
        sink.open().unwrap().write_all(b"two").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one two");
    }

    #[test]
    fn test_path_sink_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PathSink::new(dir.path().join("missing").join("out.txt"));

        assert_eq!(sink.open().unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_file_sink_writes_through_handle() {
        let file = tempfile::tempfile().unwrap();
        let sink = FileSink::new(file);
        sink.open().unwrap().write_all(b"handle").unwrap();

        let mut file = sink.into_inner();
        file.seek(SeekFrom::Start(0)).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        assert_eq!(out, "handle");
    }

    #[test]
    fn test_writer_sink_collects_writes() {
        let sink = WriterSink::new(Vec::new());
        sink.open().unwrap().write_all(b"ab").unwrap();
        sink.open().unwrap().write_all(b"cd").unwrap();

        assert_eq!(sink.borrow().as_slice(), b"abcd");
        assert_eq!(sink.into_inner().unwrap(), b"abcd".to_vec());
    }

    #[test]
    fn test_writer_sink_into_inner_fails_while_writer_open() {
        let sink = WriterSink::new(Vec::<u8>::new());
        let writer = sink.open().unwrap();

        let sink = sink.into_inner().unwrap_err();
        drop(writer);
        assert!(sink.into_inner().is_ok());
    }

    #[test]
    fn test_writer_sink_write_while_borrowed_would_block() {
        let sink = WriterSink::new(Vec::new());
        let mut writer = sink.open().unwrap();
        let view = sink.borrow();

        let err = writer.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

        drop(view);
        writer.write_all(b"x").unwrap();
        assert_eq!(sink.borrow().as_slice(), b"x");
    }

    #[test]
    fn test_text_sink_defaults_to_utf8() {
        let sink = TextSink::new(WriterSink::new(Vec::new()));
        assert_eq!(sink.charset(), Some(Charset::Utf8));
        assert_eq!(sink.get_ref().charset(), None);
    }
}
