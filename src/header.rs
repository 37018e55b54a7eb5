//! Text header tokenizer for the NRRD container
//!
//! The header is a run of newline-terminated `key: value` lines closed by one
//! empty line. Everything after that empty line is the compressed payload.

use crate::error::{NrrdError, Result};
use log::{debug, warn};
use std::collections::HashMap;

/// Prefix of the container's magic line (`NRRD0004`, `NRRD0005`, ...)
pub const NRRD_MAGIC_PREFIX: &str = "NRRD";

/// Reads `\n` or `\r\n` terminated text lines out of a byte buffer
pub struct LineReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Byte offset of the first byte not yet consumed
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read the next line without its terminator.
    ///
    /// Returns `Ok(None)` once the input is exhausted. A trailing fragment
    /// with no terminator is an error, as is a line that is not valid UTF-8.
    pub fn next_line(&mut self) -> Result<Option<&'a str>> {
        let rest = &self.bytes[self.pos..];
        if rest.is_empty() {
            return Ok(None);
        }

        let Some(newline) = rest.iter().position(|&b| b == b'\n') else {
            return Err(NrrdError::MalformedHeader(format!(
                "unterminated line at byte {}",
                self.pos
            )));
        };

        let start = self.pos;
        self.pos += newline + 1;

        let raw = &rest[..newline];
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = std::str::from_utf8(raw).map_err(|e| {
            NrrdError::MalformedHeader(format!("invalid text at byte {}: {}", start, e))
        })?;
        Ok(Some(line))
    }
}

/// Immutable key/value view of a parsed header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeader {
    magic: Option<String>,
    fields: HashMap<String, String>,
}

impl RawHeader {
    /// Look up a field by its exact (trimmed, case-sensitive) name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|s| s.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all fields in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The magic line (e.g. `NRRD0004`) if the header opened with one
    pub fn magic(&self) -> Option<&str> {
        self.magic.as_deref()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RawHeader {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut builder = HeaderBuilder::default();
        for (key, value) in iter {
            builder.insert(key, value);
        }
        builder.finish()
    }
}

/// Mutable accumulator local to a single parse
#[derive(Default)]
struct HeaderBuilder {
    magic: Option<String>,
    fields: HashMap<String, String>,
}

impl HeaderBuilder {
    fn insert(&mut self, key: &str, value: &str) {
        let key = key.trim();
        let value = value.trim();
        if let Some(previous) = self.fields.insert(key.to_string(), value.to_string()) {
            warn!(
                "duplicate header field '{}': '{}' replaced by '{}'",
                key, previous, value
            );
        } else {
            debug!("header field '{}' = '{}'", key, value);
        }
    }

    fn finish(self) -> RawHeader {
        RawHeader {
            magic: self.magic,
            fields: self.fields,
        }
    }
}

/// Tokenize the header block.
///
/// Returns the field mapping and the byte offset where the payload begins,
/// i.e. immediately after the empty separator line. If the input ends on a
/// line boundary without a separator, the offset is the input length.
pub fn parse_header(bytes: &[u8]) -> Result<(RawHeader, usize)> {
    let mut reader = LineReader::new(bytes);
    let mut builder = HeaderBuilder::default();
    let mut first = true;

    while let Some(line) = reader.next_line()? {
        if line.is_empty() {
            break;
        }

        if first && line.starts_with(NRRD_MAGIC_PREFIX) && !line.contains(':') {
            builder.magic = Some(line.to_string());
        }
        first = false;

        if line.starts_with('#') {
            debug!("skipping comment line");
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) => builder.insert(key, value),
            None => debug!("skipping line without separator: '{}'", line),
        }
    }

    Ok((builder.finish(), reader.position()))
}
