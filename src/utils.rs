//! Utility functions

use crate::error::{NrrdError, Result};

const F32_SIZE: usize = std::mem::size_of::<f32>();

/// Reinterpret little-endian bytes as `f32` samples
pub fn le_bytes_to_f32(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % F32_SIZE != 0 {
        return Err(NrrdError::CorruptPayload(format!(
            "{} bytes is not a whole number of float samples",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(F32_SIZE)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Format byte size in human-readable form
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
