//! Example: Load an NRRD scan and sweep a tracked position through it
//!
//! Run with: cargo run --example slice_scan -- path/to/scan.nrrd

use anyhow::Context;
use nrrd_volume::{LoadOptions, Volume};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: slice_scan <scan.nrrd>")?;

    let options = LoadOptions::default().with_max_samples(512 * 512 * 1024);
    let volume = Volume::load(&nrrd_volume::FileSource::new(&path), options).await?;

    println!("{}", volume.summary());
    println!("Geometry:\n{}", volume.geometry().to_json()?);

    let range = volume.value_range().context("volume has no finite samples")?;
    println!("Value range: {:.3} .. {:.3}\n", range.min, range.max);

    // A tracked hand moving from just behind the volume to past its far end
    for step in -2..=12 {
        let z = step as f64 / 10.0;
        let slice = volume.slice_at_position([0.5, 0.5, z])?;
        let mean = slice.iter().map(|(_, _, v)| v as f64).sum::<f64>()
            / (slice.width() * slice.height()) as f64;
        println!(
            "  z = {:>5.2} -> depth {:>4}  {}x{}  mean {:.4}  (normalized {:.3})",
            z,
            slice.depth(),
            slice.width(),
            slice.height(),
            mean,
            range.normalize(mean as f32)
        );
    }

    Ok(())
}
