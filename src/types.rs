//! Core data types for NRRD volumes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point or vector in world space
pub type Vec3 = [f64; 3];

/// Identity direction matrix, used when `space directions` is absent
pub const IDENTITY_DIRECTIONS: [Vec3; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// The three index axes of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Axis {
    /// Axis 0, fastest varying in the payload
    X = 0,
    /// Axis 1
    Y = 1,
    /// Axis 2, the depth axis used for slicing
    Z = 2,
}

impl Axis {
    /// Convert from usize index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    pub fn to_index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Validated geometry of a volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeGeometry {
    /// Number of samples along each axis, all positive
    pub sizes: [usize; 3],
    /// World-space position of sample (0, 0, 0)
    pub origin: Vec3,
    /// Row i is the world-space step of axis i
    pub directions: [Vec3; 3],
}

impl VolumeGeometry {
    /// Geometry with default origin and identity directions
    pub fn new(sizes: [usize; 3]) -> Self {
        Self {
            sizes,
            origin: [0.0; 3],
            directions: IDENTITY_DIRECTIONS,
        }
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_directions(mut self, directions: [Vec3; 3]) -> Self {
        self.directions = directions;
        self
    }

    /// Size along one axis
    pub fn size(&self, axis: Axis) -> usize {
        self.sizes[axis.to_index()]
    }

    /// Total number of samples, or `None` on overflow
    pub fn sample_count(&self) -> Option<usize> {
        self.sizes
            .iter()
            .try_fold(1usize, |acc, &s| acc.checked_mul(s))
    }

    /// Map a lattice coordinate to world space
    pub fn index_to_world(&self, x: usize, y: usize, z: usize) -> Vec3 {
        let mut world = self.origin;
        for (step, index) in self.directions.iter().zip([x, y, z]) {
            for (w, d) in world.iter_mut().zip(step) {
                *w += d * index as f64;
            }
        }
        world
    }

    /// Serialize the geometry as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Value range for a volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range over the finite values of `samples`, `None` if there are none
    pub fn from_samples(samples: &[f32]) -> Option<Self> {
        samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some(Self::new(v, v)),
                Some(r) => Some(Self::new(r.min.min(v), r.max.max(v))),
            })
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Map `value` into `[0, 1]` within this range
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            0.0
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        }
    }
}
