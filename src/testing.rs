//! Testing utilities for code built on brook.
//!
//! This module provides fault-injecting transports for exercising failure
//! paths, assertion macros for [`Fault`](crate::scalar::Fault) results, and
//! property-based testing support behind the `proptest` feature.
//!
//! # Examples
//!
//! ## Fault injection
//!
//! ```rust
//! use brook::io::transfer;
//! use brook::testing::{FailingReader, FailingWriter};
//! use std::io;
//!
//! let mut input = FailingReader::new(b"abc".to_vec(), io::ErrorKind::TimedOut);
//! let mut output = Vec::new();
//! let err = transfer(&mut input, &mut output).unwrap_err();
//! assert_eq!(err.moved(), 3);
//!
//! let mut input: &[u8] = b"abcdef";
//! let mut output = FailingWriter::new(2);
//! assert!(transfer(&mut input, &mut output).is_err());
//! assert_eq!(output.written(), b"ab");
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use brook::scalar::Fault;
//! use brook::{assert_checked, assert_defect};
//!
//! let checked: Result<(), Fault<&str>> = Err(Fault::Checked("missing"));
//! assert_eq!(assert_checked!(checked), "missing");
//!
//! let defect: Result<(), Fault<&str>> = Err(Fault::defect("broken invariant"));
//! assert_defect!(defect);
//! ```

use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;

use crate::io::Sink;

/// A reader that hands out at most `chunk` bytes per read.
///
/// Exercises callers that wrongly treat a short read as end of data.
#[derive(Debug)]
pub struct ChunkedReader {
    data: Vec<u8>,
    position: usize,
    chunk: usize,
    interrupting: bool,
    interrupt_next: bool,
}

impl ChunkedReader {
    /// Serves `data` in pieces of at most `chunk` bytes.
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        ChunkedReader {
            data,
            position: 0,
            chunk: chunk.max(1),
            interrupting: false,
            interrupt_next: false,
        }
    }

    /// Fails every other read with [`io::ErrorKind::Interrupted`].
    pub fn interrupting(mut self) -> Self {
        self.interrupting = true;
        self.interrupt_next = true;
        self
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupting {
            let interrupt = self.interrupt_next;
            self.interrupt_next = !interrupt;
            if interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
        }
        let remaining = &self.data[self.position..];
        let n = remaining.len().min(self.chunk).min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}

/// A reader that yields its data, then fails with a fixed error kind.
#[derive(Debug)]
pub struct FailingReader {
    data: Vec<u8>,
    position: usize,
    kind: io::ErrorKind,
}

impl FailingReader {
    /// Yields `data`, then fails every read with `kind`.
    pub fn new(data: Vec<u8>, kind: io::ErrorKind) -> Self {
        FailingReader {
            data,
            position: 0,
            kind,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.data.len() {
            return Err(io::Error::new(self.kind, "injected read failure"));
        }
        let remaining = &self.data[self.position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}

/// A writer that accepts `limit` bytes, then fails.
///
/// The write that crosses the limit is accepted partially; the next one
/// fails with [`io::ErrorKind::Other`].
#[derive(Debug)]
pub struct FailingWriter {
    written: Vec<u8>,
    limit: usize,
}

impl FailingWriter {
    /// Accepts up to `limit` bytes.
    pub fn new(limit: usize) -> Self {
        FailingWriter {
            written: Vec::new(),
            limit,
        }
    }

    /// Everything accepted so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        accept(&mut self.written, self.limit, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn accept(written: &mut Vec<u8>, limit: usize, buf: &[u8]) -> io::Result<usize> {
    let room = limit.saturating_sub(written.len());
    if room == 0 && !buf.is_empty() {
        return Err(io::Error::other("injected write failure"));
    }
    let n = room.min(buf.len());
    written.extend_from_slice(&buf[..n]);
    Ok(n)
}

/// A sink whose writers share one budget of `limit` bytes.
///
/// Content accepted by every writer opened from this sink is collected and
/// can be inspected with [`FailingSink::written`].
#[derive(Debug, Clone)]
pub struct FailingSink {
    written: Rc<RefCell<Vec<u8>>>,
    limit: usize,
}

impl FailingSink {
    /// Accepts up to `limit` bytes across all writers.
    pub fn new(limit: usize) -> Self {
        FailingSink {
            written: Rc::new(RefCell::new(Vec::new())),
            limit,
        }
    }

    /// Everything accepted so far.
    pub fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }
}

impl Sink for FailingSink {
    type Writer = FailingSinkWriter;

    fn open(&self) -> io::Result<FailingSinkWriter> {
        Ok(FailingSinkWriter {
            written: Rc::clone(&self.written),
            limit: self.limit,
        })
    }
}

/// Writer opened from a [`FailingSink`].
#[derive(Debug)]
pub struct FailingSinkWriter {
    written: Rc<RefCell<Vec<u8>>>,
    limit: usize,
}

impl Write for FailingSinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        accept(&mut self.written.borrow_mut(), self.limit, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Assert that a result failed with a declared failure, returning it.
///
/// Panics on success, on cancellation and on defects.
///
/// # Example
///
/// ```rust
/// use brook::assert_checked;
/// use brook::scalar::Fault;
///
/// let result: Result<i32, Fault<String>> = Err(Fault::Checked("nope".to_string()));
/// let error = assert_checked!(result);
/// assert_eq!(error, "nope");
/// ```
#[macro_export]
macro_rules! assert_checked {
    ($result:expr) => {
        match $result {
            ::core::result::Result::Err($crate::scalar::Fault::Checked(e)) => e,
            ::core::result::Result::Err(other) => {
                panic!("Expected Checked, got {:?}", other);
            }
            ::core::result::Result::Ok(v) => {
                panic!("Expected Checked, got Ok: {:?}", v);
            }
        }
    };
}

/// Assert that a result failed with a defect, returning the [`Defect`].
///
/// [`Defect`]: crate::scalar::Defect
///
/// # Example
///
/// ```rust
/// use brook::assert_defect;
/// use brook::scalar::Fault;
///
/// let result: Result<(), Fault<String>> = Err(Fault::defect("unreachable"));
/// let defect = assert_defect!(result);
/// assert_eq!(defect.to_string(), "unreachable");
/// ```
#[macro_export]
macro_rules! assert_defect {
    ($result:expr) => {
        match $result {
            ::core::result::Result::Err($crate::scalar::Fault::Defect(d)) => d,
            ::core::result::Result::Err(other) => {
                panic!("Expected Defect, got {:?}", other);
            }
            ::core::result::Result::Ok(v) => {
                panic!("Expected Defect, got Ok: {:?}", v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
mod arbitrary {
    use proptest::prelude::*;

    use crate::charset::Charset;
    use crate::io::ChunkSize;

    impl Arbitrary for Charset {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: ()) -> Self::Strategy {
            prop::sample::select(Charset::ALL.to_vec()).boxed()
        }
    }

    impl Arbitrary for ChunkSize {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: ()) -> Self::Strategy {
            (1usize..=64 * 1024)
                .prop_filter_map("chunk size must be positive", |n| ChunkSize::new(n).ok())
                .boxed()
        }
    }
}
