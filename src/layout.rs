//! Volume addressing - lattice offsets and depth wrap-around

use crate::error::{NrrdError, Result};

/// Wrap an integer depth into `[0, axis_len)`.
///
/// Depths wrap rather than clamp, so scrolling past either end of the volume
/// continues from the opposite end.
pub fn normalize_depth(depth: i64, axis_len: usize) -> Result<usize> {
    let n = i64::try_from(axis_len)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| NrrdError::InvalidGeometry(format!("depth axis length {}", axis_len)))?;
    // rem_euclid is never negative for a positive modulus
    Ok(depth.rem_euclid(n) as usize)
}

/// Map a continuous scan position to a wrapped depth index.
///
/// `fraction` is scaled by the axis length and floored, so `[0, 1)` spans
/// the volume once. Non-finite positions map to depth 0.
pub fn depth_from_fraction(fraction: f64, axis_len: usize) -> Result<usize> {
    let scaled = fraction * axis_len as f64;
    let depth = if scaled.is_finite() {
        // saturating cast; out-of-range values still wrap to a valid index
        scaled.floor() as i64
    } else {
        0
    };
    normalize_depth(depth, axis_len)
}

/// Size-aware addressing over a dense volume with axis 0 fastest-varying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeIndex {
    sizes: [usize; 3],
}

impl VolumeIndex {
    pub fn new(sizes: [usize; 3]) -> Result<Self> {
        if sizes.contains(&0) {
            return Err(NrrdError::InvalidGeometry(format!(
                "zero-length axis in {:?}",
                sizes
            )));
        }
        if sizes
            .iter()
            .try_fold(1usize, |acc, &s| acc.checked_mul(s))
            .is_none()
        {
            return Err(NrrdError::InvalidGeometry(format!(
                "sample count of {:?} overflows",
                sizes
            )));
        }
        Ok(Self { sizes })
    }

    pub fn sizes(&self) -> [usize; 3] {
        self.sizes
    }

    /// Total number of samples addressed; cannot overflow once constructed
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if coordinates are within bounds
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.sizes[0] && y < self.sizes[1] && z < self.sizes[2]
    }

    /// Flat offset of `(x, y, z)`: `z * sx * sy + y * sx + x`
    pub fn offset(&self, x: usize, y: usize, z: usize) -> Result<usize> {
        if !self.contains(x, y, z) {
            return Err(NrrdError::IndexOutOfRange {
                coords: [x, y, z],
                sizes: self.sizes,
            });
        }
        let [sx, sy, _] = self.sizes;
        Ok(z * sy * sx + y * sx + x)
    }

    /// Inverse of [`offset`](Self::offset)
    pub fn coords(&self, offset: usize) -> Result<[usize; 3]> {
        let [sx, sy, _] = self.sizes;
        let coords = [offset % sx, (offset / sx) % sy, offset / (sx * sy)];
        if !self.contains(coords[0], coords[1], coords[2]) {
            return Err(NrrdError::IndexOutOfRange {
                coords,
                sizes: self.sizes,
            });
        }
        Ok(coords)
    }

    /// Wrap a depth along axis 2
    pub fn wrap_depth(&self, depth: i64) -> Result<usize> {
        normalize_depth(depth, self.sizes[2])
    }
}
