//! Header validation - turns the raw key/value mapping into typed geometry

use crate::error::{NrrdError, Result};
use crate::header::RawHeader;
use crate::types::{Vec3, VolumeGeometry};
use log::debug;
use std::str::FromStr;

pub const DIMENSION_KEY: &str = "dimension";
pub const TYPE_KEY: &str = "type";
pub const ENDIAN_KEY: &str = "endian";
pub const ENCODING_KEY: &str = "encoding";
pub const SIZES_KEY: &str = "sizes";
pub const SPACE_ORIGIN_KEY: &str = "space origin";
pub const SPACE_DIRECTIONS_KEY: &str = "space directions";

/// Fields that must carry exactly these values, checked in this order
pub const REQUIRED_FIELDS: [(&str, &str); 4] = [
    (DIMENSION_KEY, "3"),
    (TYPE_KEY, "float"),
    (ENDIAN_KEY, "little"),
    (ENCODING_KEY, "gzip"),
];

/// Check the format-gating fields and extract the volume geometry
pub fn validate(header: &RawHeader) -> Result<VolumeGeometry> {
    for (key, expected) in REQUIRED_FIELDS {
        let actual = header.get(key);
        if actual != Some(expected) {
            return Err(NrrdError::unsupported(key, expected, actual));
        }
    }

    let sizes_value = header
        .get(SIZES_KEY)
        .ok_or_else(|| NrrdError::MalformedHeader(format!("missing '{}'", SIZES_KEY)))?;
    let sizes = parse_sizes(sizes_value)?;
    let mut geometry = VolumeGeometry::new(sizes);
    if geometry.sample_count().is_none() {
        return Err(NrrdError::MalformedHeader(format!(
            "sizes {:?} overflow the addressable sample count",
            sizes
        )));
    }

    match header.get(SPACE_ORIGIN_KEY) {
        Some(value) => geometry = geometry.with_origin(parse_vector(SPACE_ORIGIN_KEY, value)?),
        None => debug!("no '{}', using (0, 0, 0)", SPACE_ORIGIN_KEY),
    }

    match header.get(SPACE_DIRECTIONS_KEY) {
        Some(value) => geometry = geometry.with_directions(parse_directions(value)?),
        None => debug!("no '{}', using identity", SPACE_DIRECTIONS_KEY),
    }

    Ok(geometry)
}

/// Parse `sizes`: exactly three whitespace-separated positive integers
fn parse_sizes(value: &str) -> Result<[usize; 3]> {
    let sizes: Vec<usize> = parse_tokens(SIZES_KEY, value.split_whitespace())?;
    let sizes: [usize; 3] = sizes.try_into().map_err(|v: Vec<usize>| {
        NrrdError::MalformedHeader(format!(
            "'{}' needs 3 values, found {}",
            SIZES_KEY,
            v.len()
        ))
    })?;
    if sizes.contains(&0) {
        return Err(NrrdError::MalformedHeader(format!(
            "'{}' must be positive, found {:?}",
            SIZES_KEY, sizes
        )));
    }
    Ok(sizes)
}

/// Parse `space directions`: three whitespace-separated parenthesized triples
fn parse_directions(value: &str) -> Result<[Vec3; 3]> {
    let rows = value
        .split_whitespace()
        .map(|token| parse_vector(SPACE_DIRECTIONS_KEY, token))
        .collect::<Result<Vec<_>>>()?;
    rows.try_into().map_err(|v: Vec<Vec3>| {
        NrrdError::MalformedHeader(format!(
            "'{}' needs 3 vectors, found {}",
            SPACE_DIRECTIONS_KEY,
            v.len()
        ))
    })
}

/// Parse a `(a,b,c)` triple
fn parse_vector(key: &str, token: &str) -> Result<Vec3> {
    let inner = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| {
            NrrdError::MalformedHeader(format!("'{}': expected '(a,b,c)', found '{}'", key, token))
        })?;
    let values: Vec<f64> = parse_tokens(key, inner.split(','))?;
    values.try_into().map_err(|v: Vec<f64>| {
        NrrdError::MalformedHeader(format!(
            "'{}': expected 3 components in '{}', found {}",
            key,
            token,
            v.len()
        ))
    })
}

fn parse_tokens<'a, T: FromStr>(key: &str, tokens: impl Iterator<Item = &'a str>) -> Result<Vec<T>> {
    tokens
        .map(|t| {
            let t = t.trim();
            t.parse::<T>().map_err(|_| {
                NrrdError::MalformedHeader(format!("'{}': invalid number '{}'", key, t))
            })
        })
        .collect()
}
