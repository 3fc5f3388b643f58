//! Character sets and streaming transcoding.
//!
//! A [`Charset`] is an immutable configuration value: it is resolved once,
//! either from the enum directly or from a name via [`Charset::for_name`],
//! and never changes afterwards. Unknown names fail at lookup with
//! [`ConfigError::UnsupportedCharset`].
//!
//! Decoding is lossy in the usual way: malformed input becomes U+FFFD and
//! characters the target charset cannot represent are encoded as `?`.
//!
//! # Example
//!
//! ```rust
//! use brook::charset::Charset;
//!
//! let latin1 = Charset::for_name("iso-8859-1").unwrap();
//! assert_eq!(latin1, Charset::Latin1);
//! assert_eq!(latin1.encode("äß"), vec![0xE4, 0xDF]);
//! assert_eq!(latin1.decode(&[0xE4, 0xDF]), "äß");
//! ```

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::error::ConfigError;

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;
const UNMAPPABLE: u8 = b'?';

/// A supported character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// UTF-8, the default everywhere in this crate.
    #[default]
    Utf8,
    /// UTF-16, big-endian, no byte order mark.
    Utf16Be,
    /// UTF-16, little-endian, no byte order mark.
    Utf16Le,
    /// ISO-8859-1.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
}

impl Charset {
    /// All supported charsets.
    pub const ALL: [Charset; 5] = [
        Charset::Utf8,
        Charset::Utf16Be,
        Charset::Utf16Le,
        Charset::Latin1,
        Charset::Ascii,
    ];

    /// Looks a charset up by its canonical name or a common alias.
    ///
    /// Matching ignores ASCII case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use brook::charset::Charset;
    ///
    /// assert_eq!(Charset::for_name("UTF-8").unwrap(), Charset::Utf8);
    /// assert_eq!(Charset::for_name("utf8").unwrap(), Charset::Utf8);
    /// assert!(Charset::for_name("EBCDIC-XYZ").is_err());
    /// ```
    pub fn for_name(name: &str) -> Result<Charset, ConfigError> {
        let lowered = name.trim().to_ascii_lowercase();
        let charset = match lowered.as_str() {
            "utf-8" | "utf8" => Charset::Utf8,
            "utf-16be" | "utf16be" | "unicodebigunmarked" => Charset::Utf16Be,
            "utf-16le" | "utf16le" | "unicodelittleunmarked" => Charset::Utf16Le,
            "iso-8859-1" | "iso8859-1" | "iso_8859_1" | "latin1" | "l1" => Charset::Latin1,
            "us-ascii" | "ascii" | "iso646-us" => Charset::Ascii,
            _ => {
                return Err(ConfigError::UnsupportedCharset {
                    name: name.to_string(),
                })
            }
        };
        Ok(charset)
    }

    /// The canonical name of this charset.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Encodes `text` into a new byte vector.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        self.encode_into(text, &mut out);
        out
    }

    /// Encodes `text`, appending to `out`.
    pub fn encode_into(&self, text: &str, out: &mut Vec<u8>) {
        match self {
            Charset::Utf8 => out.extend_from_slice(text.as_bytes()),
            Charset::Utf16Be => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
            Charset::Utf16Le => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            Charset::Latin1 => out.extend(text.chars().map(|c| {
                u8::try_from(u32::from(c)).unwrap_or(UNMAPPABLE)
            })),
            Charset::Ascii => out.extend(text.chars().map(|c| {
                if c.is_ascii() {
                    c as u8
                } else {
                    UNMAPPABLE
                }
            })),
        }
    }

    /// Decodes a complete byte sequence.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut decoder = Decoder::new(*self);
        let mut out = String::with_capacity(bytes.len());
        decoder.decode(bytes, &mut out);
        decoder.finish(&mut out);
        out
    }

    /// Creates an incremental decoder for this charset.
    pub fn decoder(&self) -> Decoder {
        Decoder::new(*self)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Charset::for_name(s)
    }
}

/// Incremental decoder that tolerates sequences split across chunks.
///
/// Bytes that end in the middle of a multi-byte sequence are held back
/// until the next call to [`Decoder::decode`]; [`Decoder::finish`] flushes
/// whatever is left as a single replacement character.
#[derive(Debug, Clone)]
pub struct Decoder {
    charset: Charset,
    pending: Vec<u8>,
}

impl Decoder {
    /// Creates a decoder with no buffered input.
    pub fn new(charset: Charset) -> Self {
        Decoder {
            charset,
            pending: Vec::new(),
        }
    }

    /// The charset this decoder reads.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Decodes `bytes`, appending complete characters to `out`.
    pub fn decode(&mut self, bytes: &[u8], out: &mut String) {
        match self.charset {
            Charset::Utf8 => self.decode_utf8(bytes, out),
            Charset::Utf16Be => self.decode_utf16(bytes, out, u16::from_be_bytes),
            Charset::Utf16Le => self.decode_utf16(bytes, out, u16::from_le_bytes),
            Charset::Latin1 => out.extend(bytes.iter().map(|&b| char::from(b))),
            Charset::Ascii => out.extend(bytes.iter().map(|&b| {
                if b.is_ascii() {
                    char::from(b)
                } else {
                    REPLACEMENT
                }
            })),
        }
    }

    /// Ends the input; a dangling partial sequence becomes U+FFFD.
    pub fn finish(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(REPLACEMENT);
        }
    }

    fn decode_utf8(&mut self, bytes: &[u8], out: &mut String) {
        self.pending.extend_from_slice(bytes);
        let mut input: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    input = &[];
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        out.push_str(valid);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            input = &rest[len..];
                        }
                        // Incomplete sequence at the end: wait for more input.
                        None => {
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }
        let consumed = self.pending.len() - input.len();
        self.pending.drain(..consumed);
    }

    fn decode_utf16(&mut self, bytes: &[u8], out: &mut String, unit: fn([u8; 2]) -> u16) {
        self.pending.extend_from_slice(bytes);
        let mut units: Vec<u16> = self
            .pending
            .chunks_exact(2)
            .map(|pair| unit([pair[0], pair[1]]))
            .collect();
        let mut keep = self.pending.len() % 2;
        if matches!(units.last().copied(), Some(0xD800..=0xDBFF)) {
            units.pop();
            keep += 2;
        }
        out.extend(char::decode_utf16(units).map(|c| c.unwrap_or(REPLACEMENT)));
        let consumed = self.pending.len() - keep;
        self.pending.drain(..consumed);
    }
}

/// A writer that re-encodes bytes from one charset into another.
///
/// Every buffer accepted by [`Write::write`] is decoded with the source
/// charset and the resulting text is written to the inner writer encoded in
/// the target charset. Call [`Transcoder::finish`] once the input ends so a
/// trailing partial sequence is reported instead of silently dropped.
#[derive(Debug)]
pub struct Transcoder<W> {
    inner: W,
    decoder: Decoder,
    target: Charset,
    text: String,
    encoded: Vec<u8>,
}

impl<W: Write> Transcoder<W> {
    /// Creates a transcoder reading `from` and writing `to` into `inner`.
    pub fn new(inner: W, from: Charset, to: Charset) -> Self {
        Transcoder {
            inner,
            decoder: Decoder::new(from),
            target: to,
            text: String::new(),
            encoded: Vec::new(),
        }
    }

    /// Flushes any held-back input and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.decoder.finish(&mut self.text);
        self.drain()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// The wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    fn drain(&mut self) -> io::Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }
        self.target.encode_into(&self.text, &mut self.encoded);
        self.text.clear();
        let result = self.inner.write_all(&self.encoded);
        self.encoded.clear();
        result
    }
}

impl<W: Write> Write for Transcoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.decoder.decode(buf, &mut self.text);
        self.drain()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Charset;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Charset {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for Charset {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let name = String::deserialize(deserializer)?;
            Charset::for_name(&name).map_err(serde::de::Error::custom)
        }
    }
}
