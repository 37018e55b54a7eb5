//! Integration tests over complete in-memory and on-disk containers
//!
//! Fixtures are assembled here: a text header followed by a gzip stream of
//! little-endian floats, the layout produced by common scan exporters.

use flate2::write::GzEncoder;
use flate2::Compression;
use nrrd_volume::types::IDENTITY_DIRECTIONS;
use nrrd_volume::{ErrorKind, LoadOptions, MemorySource, NrrdError, Volume};
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

const HEADER_2X3X4: &str = "NRRD0004\n\
# Complete NRRD file format specification at:\n\
# http://teem.sourceforge.net/nrrd/format.html\n\
type: float\n\
dimension: 3\n\
space: left-posterior-superior\n\
sizes: 2 3 4\n\
space directions: (0.5,0,0) (0,0.5,0) (0,0,2)\n\
kinds: domain domain domain\n\
endian: little\n\
encoding: gzip\n\
space origin: (1.5,-2,0.25)\n\
\n";

fn known_samples() -> Vec<f32> {
    (0..24).map(|i| (i as f32 - 11.5) * 0.25).collect()
}

fn gzip_floats(samples: &[f32]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for s in samples {
        encoder.write_all(&s.to_le_bytes()).unwrap();
    }
    encoder.finish().unwrap()
}

fn container(header: &str, samples: &[f32]) -> Vec<u8> {
    let mut bytes = header.as_bytes().to_vec();
    bytes.extend(gzip_floats(samples));
    bytes
}

#[test]
fn test_round_trip_known_samples() {
    let _ = env_logger::builder().is_test(true).try_init();
    let samples = known_samples();
    let volume = Volume::from_bytes(&container(HEADER_2X3X4, &samples)).unwrap();

    assert_eq!(volume.sizes(), [2, 3, 4]);
    assert_eq!(volume.samples(), samples.as_slice());
    assert_eq!(volume.sample_at(0, 0, 0).unwrap(), samples[0]);
    assert_eq!(volume.sample_at(1, 2, 3).unwrap(), samples[23]);
    assert_eq!(
        volume.sample_at(2, 0, 0).unwrap_err().kind(),
        ErrorKind::IndexOutOfRange
    );
}

#[test]
fn test_geometry_from_header() {
    let volume = Volume::from_bytes(&container(HEADER_2X3X4, &known_samples())).unwrap();
    let geometry = volume.geometry();
    assert_eq!(geometry.origin, [1.5, -2.0, 0.25]);
    assert_eq!(
        geometry.directions,
        [[0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 2.0]]
    );
    assert_eq!(geometry.index_to_world(1, 1, 1), [2.0, -1.5, 2.25]);

    // non-core fields stay readable
    assert_eq!(volume.header().get("kinds"), Some("domain domain domain"));
    assert_eq!(volume.header().magic(), Some("NRRD0004"));
}

#[test]
fn test_optional_fields_default() {
    let header = "NRRD0004\ntype: float\ndimension: 3\nsizes: 2 3 4\nendian: little\nencoding: gzip\n\n";
    let volume = Volume::from_bytes(&container(header, &known_samples())).unwrap();
    assert_eq!(volume.geometry().origin, [0.0, 0.0, 0.0]);
    assert_eq!(volume.geometry().directions, IDENTITY_DIRECTIONS);
}

#[test]
fn test_crlf_container() {
    let header = HEADER_2X3X4.replace('\n', "\r\n");
    let volume = Volume::from_bytes(&container(&header, &known_samples())).unwrap();
    assert_eq!(volume.samples(), known_samples().as_slice());
    assert_eq!(volume.geometry().origin, [1.5, -2.0, 0.25]);
}

#[test]
fn test_rejects_two_dimensional() {
    let header = HEADER_2X3X4.replace("dimension: 3", "dimension: 2");
    let err = Volume::from_bytes(&container(&header, &known_samples())).unwrap_err();
    match err {
        NrrdError::UnsupportedFormat { key, .. } => assert_eq!(key, "dimension"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_rejects_two_sizes() {
    let header = HEADER_2X3X4.replace("sizes: 2 3 4", "sizes: 2 3");
    let err = Volume::from_bytes(&container(&header, &known_samples())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedHeader);
}

#[test]
fn test_rejects_truncated_payload() {
    let bytes = container(HEADER_2X3X4, &known_samples());
    let err = Volume::from_bytes(&bytes[..bytes.len() - 12]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptPayload);
}

#[test]
fn test_rejects_sample_count_mismatch() {
    let err = Volume::from_bytes(&container(HEADER_2X3X4, &known_samples()[..20])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptPayload);
}

#[test]
fn test_rejects_huge_declared_sizes() {
    let header = HEADER_2X3X4.replace("sizes: 2 3 4", "sizes: 100000 100000 100000");
    let err = Volume::from_bytes(&container(&header, &[1.0])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptPayload);
}

#[test]
fn test_multi_member_payload() {
    let samples = known_samples();
    let mut bytes = HEADER_2X3X4.as_bytes().to_vec();
    bytes.extend(gzip_floats(&samples[..12]));
    bytes.extend(gzip_floats(&samples[12..]));
    let volume = Volume::from_bytes(&bytes).unwrap();
    assert_eq!(volume.samples(), samples.as_slice());
}

#[test]
fn test_rejects_unterminated_header() {
    let err = Volume::from_bytes(b"NRRD0004\ntype: float").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedHeader);
}

#[test]
fn test_load_options_limits() {
    let bytes = container(HEADER_2X3X4, &known_samples());

    let options = LoadOptions::default().with_max_samples(23);
    let err = Volume::from_bytes_with(&bytes, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);

    let options = LoadOptions::default().with_max_samples(24);
    assert!(Volume::from_bytes_with(&bytes, &options).is_ok());
}

#[test]
fn test_load_options_magic() {
    let without_magic = HEADER_2X3X4.replacen("NRRD0004\n", "", 1);
    let bytes = container(&without_magic, &known_samples());
    assert!(Volume::from_bytes(&bytes).is_ok());

    let options = LoadOptions::default().with_require_magic(true);
    let err = Volume::from_bytes_with(&bytes, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedHeader);
}

#[test]
fn test_scan_sweep_wraps_through_volume() {
    let volume = Volume::from_bytes(&container(HEADER_2X3X4, &known_samples())).unwrap();
    let depths: Vec<usize> = [-0.5, -0.25, 0.0, 0.3, 0.99, 1.0, 1.6]
        .iter()
        .map(|&z| volume.slice_at_position([0.0, 0.0, z]).unwrap().depth())
        .collect();
    assert_eq!(depths, vec![2, 3, 0, 1, 3, 0, 2]);

    let slice = volume.slice_at_depth(-3).unwrap();
    assert_eq!(slice.depth(), 1);
    assert_eq!((slice.width(), slice.height()), (2, 3));
    assert_eq!(slice.as_slice(), &known_samples()[6..12]);
}

#[test]
fn test_concurrent_readers() {
    let volume = Arc::new(Volume::from_bytes(&container(HEADER_2X3X4, &known_samples())).unwrap());

    let handles: Vec<_> = (0..4i64)
        .map(|t| {
            let volume = Arc::clone(&volume);
            std::thread::spawn(move || {
                (0..100i64)
                    .map(|d| volume.slice_at_depth(d * 4 + t).unwrap().depth())
                    .all(|depth| depth == t as usize)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[tokio::test]
async fn test_open_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scan.nrrd");
    std::fs::write(&path, container(HEADER_2X3X4, &known_samples())).unwrap();

    let volume = Volume::open(&path).await.unwrap();
    assert_eq!(volume.samples(), known_samples().as_slice());
}

#[tokio::test]
async fn test_open_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = Volume::open(temp_dir.path().join("missing.nrrd"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn test_load_from_memory_source() {
    let source = MemorySource::new(container(HEADER_2X3X4, &known_samples()));
    let volume = Volume::load(&source, LoadOptions::default()).await.unwrap();
    assert_eq!(volume.sizes(), [2, 3, 4]);
}
