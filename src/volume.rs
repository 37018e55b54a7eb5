//! Decoded volume - the main API for loading containers and querying slices

use crate::compression::{decode_payload, get_decoder, Encoding};
use crate::error::{NrrdError, Result};
use crate::header::{parse_header, RawHeader};
use crate::io::{ByteSource, FileSource};
use crate::layout::{depth_from_fraction, normalize_depth, VolumeIndex};
use crate::metadata::{validate, ENCODING_KEY};
use crate::types::{ValueRange, VolumeGeometry};
use crate::utils::format_bytes;
use log::info;
use ndarray::{ArrayView2, ArrayView3};
use std::path::Path;

/// Options applied while loading a container
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    max_samples: Option<usize>,
    require_magic: bool,
}

impl LoadOptions {
    /// Refuse volumes declaring more than `max_samples` samples
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// Require the header to open with an `NRRD000x` magic line
    pub fn with_require_magic(mut self, require_magic: bool) -> Self {
        self.require_magic = require_magic;
        self
    }

    pub fn max_samples(&self) -> Option<usize> {
        self.max_samples
    }

    pub fn require_magic(&self) -> bool {
        self.require_magic
    }
}

/// A dense 3D float volume with its header and geometry.
///
/// Immutable once constructed; share it across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Volume {
    header: RawHeader,
    geometry: VolumeGeometry,
    index: VolumeIndex,
    samples: Vec<f32>,
}

impl Volume {
    /// Parse a complete container held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &LoadOptions::default())
    }

    /// Parse a complete container with explicit options
    pub fn from_bytes_with(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        let (header, payload_start) = parse_header(bytes)?;
        if options.require_magic && header.magic().is_none() {
            return Err(NrrdError::MalformedHeader(
                "missing NRRD magic line".to_string(),
            ));
        }

        let geometry = validate(&header)?;
        let sample_count = geometry.sample_count().ok_or_else(|| {
            NrrdError::MalformedHeader(format!("sizes {:?} overflow", geometry.sizes))
        })?;
        if let Some(max) = options.max_samples {
            if sample_count > max {
                return Err(NrrdError::LimitExceeded(format!(
                    "{} samples declared, limit is {}",
                    sample_count, max
                )));
            }
        }

        let encoding = header.get(ENCODING_KEY).unwrap_or_default();
        let decoder = Encoding::from_header_value(encoding)
            .map(get_decoder)
            .ok_or_else(|| {
                NrrdError::unsupported(ENCODING_KEY, Encoding::Gzip.as_str(), Some(encoding))
            })?;
        let samples = decode_payload(decoder.as_ref(), &bytes[payload_start..], geometry.sizes)?;

        Self::assemble(header, geometry, samples)
    }

    /// Build a volume from already-decoded samples in axis-0-fastest order
    pub fn from_samples(geometry: VolumeGeometry, samples: Vec<f32>) -> Result<Self> {
        Self::assemble(RawHeader::default(), geometry, samples)
    }

    fn assemble(header: RawHeader, geometry: VolumeGeometry, samples: Vec<f32>) -> Result<Self> {
        let index = VolumeIndex::new(geometry.sizes)?;
        if index.len() != samples.len() {
            return Err(NrrdError::InvalidGeometry(format!(
                "sizes {:?} need {} samples, got {}",
                geometry.sizes,
                index.len(),
                samples.len()
            )));
        }
        Ok(Self {
            header,
            geometry,
            index,
            samples,
        })
    }

    /// Open a container on the local file system
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&FileSource::new(path), LoadOptions::default()).await
    }

    /// Read a container from any byte source.
    ///
    /// Decoding runs on the blocking pool; nothing is returned until the
    /// volume is complete.
    pub async fn load(source: &dyn ByteSource, options: LoadOptions) -> Result<Self> {
        let bytes = source.read_all().await?;
        let volume = tokio::task::spawn_blocking(move || Self::from_bytes_with(&bytes, &options))
            .await
            .map_err(|e| NrrdError::Io(std::io::Error::other(e)))??;
        info!("loaded {}: {}", source.describe(), volume.summary());
        Ok(volume)
    }

    /// Header fields as read from the container
    pub fn header(&self) -> &RawHeader {
        &self.header
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn sizes(&self) -> [usize; 3] {
        self.geometry.sizes
    }

    pub fn index(&self) -> &VolumeIndex {
        &self.index
    }

    /// All samples, axis 0 fastest-varying
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// The samples as a `[z, y, x]` indexed array view
    pub fn view(&self) -> Result<ArrayView3<'_, f32>> {
        let [sx, sy, sz] = self.geometry.sizes;
        ArrayView3::from_shape((sz, sy, sx), self.samples.as_slice())
            .map_err(|e| NrrdError::InvalidGeometry(e.to_string()))
    }

    /// Bounds-checked lookup of a single sample
    pub fn sample_at(&self, x: usize, y: usize, z: usize) -> Result<f32> {
        let offset = self.index.offset(x, y, z)?;
        Ok(self.samples[offset])
    }

    /// The cross-section at an exact depth
    pub fn depth_slice(&self, depth: usize) -> Result<DepthSlice<'_>> {
        let [sx, sy, sz] = self.geometry.sizes;
        if depth >= sz {
            return Err(NrrdError::IndexOutOfRange {
                coords: [0, 0, depth],
                sizes: self.geometry.sizes,
            });
        }
        let plane = sx * sy;
        DepthSlice::new(depth, sx, sy, &self.samples[depth * plane..(depth + 1) * plane])
    }

    /// The cross-section at a depth that wraps around the volume
    pub fn slice_at_depth(&self, depth: i64) -> Result<DepthSlice<'_>> {
        self.depth_slice(normalize_depth(depth, self.geometry.sizes[2])?)
    }

    /// The cross-section for a normalized scan position; only `z` is used
    pub fn slice_at_position(&self, position: [f64; 3]) -> Result<DepthSlice<'_>> {
        self.depth_slice(depth_from_fraction(position[2], self.geometry.sizes[2])?)
    }

    /// Min/max over the finite samples
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::from_samples(&self.samples)
    }

    /// Get a summary string of the volume
    pub fn summary(&self) -> String {
        let [sx, sy, sz] = self.geometry.sizes;
        format!(
            "{} x {} x {} float volume, {} samples, {}",
            sx,
            sy,
            sz,
            self.samples.len(),
            format_bytes(std::mem::size_of_val(self.samples.as_slice()))
        )
    }
}

/// A fixed-depth cross-section, `width` along axis 0 by `height` along axis 1
#[derive(Debug, Clone)]
pub struct DepthSlice<'a> {
    depth: usize,
    samples: &'a [f32],
    view: ArrayView2<'a, f32>,
}

impl<'a> DepthSlice<'a> {
    fn new(depth: usize, width: usize, height: usize, samples: &'a [f32]) -> Result<Self> {
        let view = ArrayView2::from_shape((height, width), samples)
            .map_err(|e| NrrdError::InvalidGeometry(e.to_string()))?;
        Ok(Self {
            depth,
            samples,
            view,
        })
    }

    /// Depth index of this slice along axis 2
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of samples along axis 0
    pub fn width(&self) -> usize {
        self.view.ncols()
    }

    /// Number of samples along axis 1
    pub fn height(&self) -> usize {
        self.view.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.view.get((y, x)).copied()
    }

    /// Rows are `y`, columns are `x`
    pub fn view(&self) -> ArrayView2<'a, f32> {
        self.view
    }

    /// The slice samples, `x` fastest-varying
    pub fn as_slice(&self) -> &'a [f32] {
        self.samples
    }

    /// Iterate `(x, y, value)` with `x` fastest-varying
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + 'a {
        let width = self.width();
        self.samples
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % width, i / width, v))
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.to_vec()
    }
}
