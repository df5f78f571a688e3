// benches/batch_benchmark.rs
//
// Compares sequential and parallel batches over a generated dataset.
// Run with: cargo bench --bench batch_benchmark

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use batchzip::batch::{BatchConfig, BatchRun};
use batchzip::common::format_bytes;
use batchzip::console::Console;
use rand::{thread_rng, Rng, RngCore};
use tempfile::tempdir;

const FILE_COUNT: usize = 48;

struct BenchProfile {
    name: &'static str,
    threads: usize,
}

// Mix of compressible text and random blobs, sizes from 4 KiB to 4 MiB.
fn create_dataset(dir: &Path) -> io::Result<u64> {
    fs::create_dir_all(dir)?;
    let mut rng = thread_rng();
    let mut total = 0u64;
    for i in 0..FILE_COUNT {
        let size = 4096usize << rng.gen_range(0..11);
        let mut buf = vec![0u8; size];
        if i % 2 == 0 {
            rng.fill_bytes(&mut buf);
        } else {
            for (j, b) in buf.iter_mut().enumerate() {
                *b = b"the quick brown fox jumps over the lazy dog\n"[j % 44];
            }
        }
        File::create(dir.join(format!("file_{i:03}.dat")))?.write_all(&buf)?;
        total += size as u64;
    }
    Ok(total)
}

fn run_profile(input: &Path, output: &Path, profile: &BenchProfile) -> Result<Duration, Box<dyn std::error::Error>> {
    if output.exists() {
        fs::remove_dir_all(output)?;
    }
    let config = BatchConfig::new(input, output, "benchmark-password")?.with_threads(profile.threads);
    let run = BatchRun::new(config, Console::buffered());
    let start = Instant::now();
    let outcome = run.process_all()?;
    let elapsed = start.elapsed();
    assert!(outcome.is_success(), "benchmark batch had failures");
    Ok(elapsed)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let input = root.path().join("input");
    let output = root.path().join("output");
    let total = create_dataset(&input)?;
    println!("Dataset: {FILE_COUNT} files, {}", format_bytes(total));

    let profiles = [
        BenchProfile { name: "sequential (1 thread)", threads: 1 },
        BenchProfile { name: "parallel (2 threads)", threads: 2 },
        BenchProfile { name: "parallel (auto)", threads: 0 },
    ];

    println!("{:<24} {:>12} {:>14}", "Profile", "Time", "Throughput");
    for profile in &profiles {
        let elapsed = run_profile(&input, &output, profile)?;
        let bps = total as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        println!(
            "{:<24} {:>10.2?} {:>12}/s",
            profile.name,
            elapsed,
            format_bytes(bps as u64)
        );
    }
    Ok(())
}
