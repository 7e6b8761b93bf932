//! Generate-feed command implementation.
//!
//! Writes a synthetic mmapbench CSV feed, optionally paced to look like a
//! benchmark that is still running. Useful for trying the dashboard without
//! a block device to benchmark:
//!
//! `mmapbench-live generate-feed --delay-ms 200 | mmapbench-live`

use anyhow::{Context, Result};
use rand::Rng;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;

use crate::record::CSV_HEADER;

/// Thread counts cycled through by the synthetic benchmark.
const THREAD_STEPS: [i64; 5] = [1, 2, 4, 8, 16];

/// Writes the header and `rows` rows per device to `out`.
///
/// Rows of all devices are interleaved per step. The output is flushed after
/// every row so a reader on the other end of a pipe sees it immediately.
pub fn write_feed<W: Write, R: Rng>(
    out: &mut W,
    rows: usize,
    devices: &[&str],
    delay: Duration,
    rng: &mut R,
) -> io::Result<usize> {
    writeln!(out, "{CSV_HEADER}")?;
    out.flush()?;

    let mut time = vec![0.0f64; devices.len()];
    let mut written = 0;

    for seq in 0..rows {
        for (i, dev) in devices.iter().enumerate() {
            time[i] += rng.gen_range(0.5..1.5);
            let threads = THREAD_STEPS[seq % THREAD_STEPS.len()];
            let hint = (seq / THREAD_STEPS.len()) % 3;
            let work_gb: f64 = rng.gen_range(0.5..4.0) * threads as f64;
            let read_gb = work_gb * rng.gen_range(0.6..1.0);
            let tlb: u64 = rng.gen_range(0..50_000) * threads as u64;
            let cpu_work: u64 = rng.gen_range(1_000..100_000);

            writeln!(
                out,
                "{dev},{seq},{hint},{threads},{:.3},{:.3},{tlb},{:.3},{cpu_work}",
                time[i], work_gb, read_gb
            )?;
            out.flush()?;
            written += 1;

            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }

    Ok(written)
}

/// Generates a synthetic feed into `output` (stdout when `None`).
pub fn command_generate_feed(
    output: Option<PathBuf>,
    rows: usize,
    devices: &str,
    delay_ms: u64,
) -> Result<()> {
    let devices: Vec<&str> = devices
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect();
    if devices.is_empty() {
        anyhow::bail!("at least one device name is required");
    }

    let delay = Duration::from_millis(delay_ms);
    let mut rng = rand::thread_rng();

    let written = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_feed(&mut out, rows, &devices, delay, &mut rng)?
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_feed(&mut out, rows, &devices, delay, &mut rng)?
        }
    };

    if let Some(path) = output {
        info!("Wrote {} rows to {}", written, path.display());
    }
    Ok(())
}
