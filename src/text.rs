//! Text produced on demand.
//!
//! [`Text`] is implemented by string literals and by [`TextOf`], which
//! decodes the content of any [`Source`] each time it is asked for.
//! [`Contains`] accepts any mix of the two.
//!
//! # Example
//!
//! ```rust
//! use brook::io::BytesSource;
//! use brook::scalar::Scalar;
//! use brook::text::{Contains, TextOf};
//!
//! let lazy = TextOf::new(BytesSource::from("Elegant Object"));
//! assert!(Contains::new(lazy, "Elegant").value().unwrap());
//! assert!(!Contains::new("Lazy dog", "cat").value().unwrap());
//! ```

use std::io::{self, Read};

use crate::charset::Charset;
use crate::io::{BytesSource, Source};
use crate::scalar::Scalar;

/// A sequence of characters that may have to be produced first.
pub trait Text {
    /// Produces the full text.
    fn as_string(&self) -> io::Result<String>;
}

impl Text for str {
    fn as_string(&self) -> io::Result<String> {
        Ok(self.to_owned())
    }
}

impl Text for String {
    fn as_string(&self) -> io::Result<String> {
        Ok(self.clone())
    }
}

impl<T: Text + ?Sized> Text for &T {
    fn as_string(&self) -> io::Result<String> {
        (**self).as_string()
    }
}

/// The content of a [`Source`], decoded in a charset.
///
/// The source is opened and read to the end on every call.
#[derive(Debug, Clone)]
pub struct TextOf<S> {
    source: S,
    charset: Charset,
}

impl<S> TextOf<S> {
    /// Decodes `source` as UTF-8.
    pub fn new(source: S) -> Self {
        TextOf {
            source,
            charset: Charset::default(),
        }
    }

    /// Decodes in `charset` instead.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// The charset used for decoding.
    pub fn charset(&self) -> Charset {
        self.charset
    }
}

impl From<&str> for TextOf<BytesSource> {
    fn from(text: &str) -> Self {
        TextOf::new(BytesSource::from(text))
    }
}

impl<S: Source> Text for TextOf<S> {
    fn as_string(&self) -> io::Result<String> {
        let mut reader = self.source.open()?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(self.charset.decode(&bytes))
    }
}

impl<S: Source> Scalar for TextOf<S> {
    type Output = String;
    type Error = io::Error;

    fn value(&self) -> io::Result<String> {
        self.as_string()
    }
}

/// Whether one text occurs in another.
///
/// Both operands are produced once per evaluation; the search is an exact
/// comparison of characters. An empty needle is always found.
#[derive(Debug, Clone)]
pub struct Contains<H, N> {
    haystack: H,
    needle: N,
}

impl<H: Text, N: Text> Contains<H, N> {
    /// Looks for `needle` in `haystack`.
    pub fn new(haystack: H, needle: N) -> Self {
        Contains { haystack, needle }
    }
}

impl<H: Text, N: Text> Scalar for Contains<H, N> {
    type Output = bool;
    type Error = io::Error;

    fn value(&self) -> io::Result<bool> {
        let haystack = self.haystack.as_string()?;
        let needle = self.needle.as_string()?;
        Ok(haystack.contains(needle.as_str()))
    }
}
