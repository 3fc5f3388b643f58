//! # Brook
//!
//! Lazy, composable wrappers over byte sources, byte sinks and fallible
//! computations.
//!
//! ## Overview
//!
//! Every building block is a small capability that does nothing until it
//! is asked to:
//!
//! - a [`Source`] opens a reader on demand
//! - a [`Sink`] opens a writer on demand
//! - a [`Scalar`] computes a value on demand, every time
//!
//! Wrappers own or borrow the capability they decorate and add one
//! behavior. [`TeeSource`] mirrors everything it reads into a sink.
//! [`Checked`] remaps the declared failures of a computation while letting
//! defects through untouched.
//!
//! ## Quick Example
//!
//! ```rust
//! use brook::prelude::*;
//! use std::io::Read;
//!
//! let log = WriterSink::new(Vec::new());
//! let tee = TeeSource::new(BytesSource::from("Hello, товарищ!"), &log);
//!
//! let mut seen = String::new();
//! tee.open()?.read_to_string(&mut seen)?;
//!
//! assert_eq!(seen, "Hello, товарищ!");
//! assert_eq!(log.borrow().as_slice(), "Hello, товарищ!".as_bytes());
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): emit `tracing` events from transfers, tees and
//!   checked evaluation
//! - `serde`: serialize [`Charset`] and [`ChunkSize`]
//! - `proptest`: `Arbitrary` implementations for configuration values
//!
//! [`Source`]: io::Source
//! [`Sink`]: io::Sink
//! [`Scalar`]: scalar::Scalar
//! [`TeeSource`]: io::TeeSource
//! [`Checked`]: scalar::Checked
//! [`ChunkSize`]: io::ChunkSize

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod charset;
pub mod error;
pub mod io;
pub mod scalar;
pub mod testing;
pub mod text;

// Re-exports
pub use charset::Charset;
pub use error::{ConfigError, Side, TransferError};
pub use io::{ChunkSize, Sink, Source, Transfer};
pub use scalar::{Fault, Scalar, ScalarExt};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::charset::Charset;
    pub use crate::error::{ConfigError, TransferError};
    pub use crate::io::{
        BytesSource, ChunkSize, PathSink, PathSource, Sink, Source, TeeSink, TeeSource,
        TextSink, Transfer, WriterSink,
    };
    pub use crate::scalar::{checked, from_fn, CancelToken, Checked, Fault, Scalar, ScalarExt};
    pub use crate::text::{Contains, Text, TextOf};
}
