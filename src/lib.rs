//! nrrd-volume - NRRD scan reader
//!
//! A pure Rust reader for gzip-encoded 3D float volumes stored in the NRRD
//! container format, with depth slicing for scan visualization.
//!
//! # Features
//!
//! - Line-oriented header tokenizer accepting `\n` and `\r\n` endings
//! - Strict format gating (`dimension: 3`, `type: float`, `endian: little`,
//!   `encoding: gzip`) with typed errors naming the offending field
//! - Geometry extraction (`sizes`, `space origin`, `space directions`)
//! - Bounds-checked sample lookup and wrap-around depth slicing
//! - Async loading from the local filesystem (implement `ByteSource` for
//!   other storage)
//!
//! # Example
//!
//! ```rust,ignore
//! use nrrd_volume::Volume;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let volume = Volume::open("scans/chest.nrrd").await?;
//!
//! // Tracked position in [0, 1) along each axis; depth wraps outside that range
//! let slice = volume.slice_at_position([0.2, 0.4, 0.75])?;
//! for (x, y, value) in slice.iter() {
//!     // hand off to a renderer
//! }
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod error;
pub mod header;
pub mod io;
pub mod layout;
pub mod metadata;
pub mod types;
pub mod utils;
pub mod volume;

// Re-exports
pub use compression::{decode_payload, Encoding, GzipDecoder, PayloadDecoder};
pub use error::{ErrorKind, NrrdError, Result};
pub use header::{parse_header, LineReader, RawHeader};
pub use io::{ByteSource, FileSource, MemorySource};
pub use layout::{depth_from_fraction, normalize_depth, VolumeIndex};
pub use metadata::validate;
pub use types::{Axis, ValueRange, Vec3, VolumeGeometry};
pub use volume::{DepthSlice, LoadOptions, Volume};

/// Version of this crate
pub const NRRD_VOLUME_VERSION: &str = env!("CARGO_PKG_VERSION");
