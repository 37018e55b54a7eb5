//! Example: Share one decoded volume between many slice readers
//!
//! Run with: cargo run --example concurrent_slicing -- path/to/scan.nrrd

use anyhow::Context;
use nrrd_volume::Volume;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: concurrent_slicing <scan.nrrd>")?;

    let start = Instant::now();
    let volume = Arc::new(Volume::open(&path).await?);
    println!("Loaded {} in {:?}", volume.summary(), start.elapsed());

    let depth = volume.sizes()[2] as i64;
    let start = Instant::now();
    let tasks: Vec<_> = (0..8i64)
        .map(|reader| {
            let volume = Arc::clone(&volume);
            tokio::task::spawn_blocking(move || -> nrrd_volume::Result<f64> {
                let mut total = 0.0;
                // each reader scrolls two full turns, offset from the others
                for d in 0..depth * 2 {
                    let slice = volume.slice_at_depth(d + reader * depth / 8)?;
                    total += slice.as_slice().iter().map(|&v| v as f64).sum::<f64>();
                }
                Ok(total)
            })
        })
        .collect();

    for (reader, task) in tasks.into_iter().enumerate() {
        let total = task.await??;
        println!("  reader {}: sum {:.3}", reader, total);
    }
    println!("Swept {} slices per reader in {:?}", depth * 2, start.elapsed());

    Ok(())
}
