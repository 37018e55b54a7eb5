//! Payload decompression and sample decoding

use crate::error::{NrrdError, Result};
use crate::utils::le_bytes_to_f32;
use flate2::read::MultiGzDecoder;
use std::io::Read;

/// Upper bound on deflate output per input byte
const MAX_DEFLATE_RATIO: usize = 1032;

/// Payload encodings this crate decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// gzip stream, possibly several concatenated members
    Gzip,
}

impl Encoding {
    /// Recognise the value of the `encoding` header field
    pub fn from_header_value(value: &str) -> Option<Self> {
        match value {
            "gzip" => Some(Encoding::Gzip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
        }
    }
}

/// Trait for turning an encoded payload back into raw bytes
pub trait PayloadDecoder: Send + Sync {
    /// Decompress `data`, reading at most `limit` bytes of output
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>>;

    /// Get the encoding handled by this decoder
    fn encoding(&self) -> Encoding;
}

/// gzip payload decoder
#[derive(Debug, Default)]
pub struct GzipDecoder;

impl PayloadDecoder for GzipDecoder {
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>> {
        // `limit` comes from the header; only the input length bounds real output
        let capacity = limit.min(data.len().saturating_mul(MAX_DEFLATE_RATIO));
        let mut decompressed = Vec::with_capacity(capacity);
        MultiGzDecoder::new(data)
            .take(limit as u64)
            .read_to_end(&mut decompressed)
            .map_err(|e| NrrdError::CorruptPayload(format!("gzip: {}", e)))?;
        Ok(decompressed)
    }

    fn encoding(&self) -> Encoding {
        Encoding::Gzip
    }
}

/// Get the decoder for a given encoding
pub fn get_decoder(encoding: Encoding) -> Box<dyn PayloadDecoder> {
    match encoding {
        Encoding::Gzip => Box::new(GzipDecoder),
    }
}

/// Decode the payload into `sizes[0] * sizes[1] * sizes[2]` little-endian floats.
///
/// Output is read one byte past the expected length so that an oversized
/// stream is detected without inflating it completely.
pub fn decode_payload(
    decoder: &dyn PayloadDecoder,
    payload: &[u8],
    sizes: [usize; 3],
) -> Result<Vec<f32>> {
    let expected_bytes = sizes
        .iter()
        .try_fold(4usize, |acc, &s| acc.checked_mul(s))
        .ok_or_else(|| NrrdError::CorruptPayload(format!("sizes {:?} overflow", sizes)))?;

    let decompressed = decoder.decompress(payload, expected_bytes.saturating_add(1))?;
    if decompressed.len() != expected_bytes {
        let found = if decompressed.len() > expected_bytes {
            format!("more than {}", expected_bytes)
        } else {
            decompressed.len().to_string()
        };
        return Err(NrrdError::CorruptPayload(format!(
            "sizes {:?} need {} bytes, decompressed {}",
            sizes, expected_bytes, found
        )));
    }

    le_bytes_to_f32(&decompressed)
}
