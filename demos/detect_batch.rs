//! Example: Detect vocal gaps of many songs in parallel
//!
//! Usage:
//!   cargo run --release --example detect_batch -- [--jobs N] [--json] <vocals.wav>:<stored_gap_ms> ...
//!
//! Notes:
//! - Parallelism is across songs. Each song is scanned on a single thread.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use std::env;
use std::time::Instant;
use vocal_gap::{perform_batch, GapConfig, GapJob, ScanningProvider, StemFileBackend};

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn parse_job(arg: &str) -> Result<GapJob, Box<dyn std::error::Error>> {
    let (path, gap) = arg
        .rsplit_once(':')
        .ok_or_else(|| format!("expected <path>:<stored_gap_ms>, got {arg}"))?;
    Ok(GapJob::new(path, gap.parse::<u64>()?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut songs: Vec<GapJob> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: detect_batch [--jobs N] [--json] <vocals.wav>:<stored_gap_ms> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => songs.push(parse_job(&a)?),
        }
    }

    if songs.is_empty() {
        eprintln!("ERROR: Provide at least one <vocals.wav>:<stored_gap_ms>. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} songs, jobs={}", songs.len(), jobs);

    let config = GapConfig::default();
    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let results = pool.install(|| {
        perform_batch(&songs, &config, || {
            ScanningProvider::from_config(StemFileBackend::new(), &config)
        })
    });

    let mut mismatches = 0;
    let mut failures = 0;
    for (job, result) in songs.iter().zip(&results) {
        match result {
            Ok(r) => {
                if !r.is_match() {
                    mismatches += 1;
                }
                if json {
                    println!("{}", serde_json::to_string(r)?);
                } else {
                    println!(
                        "{}: {:.0} ms (stored {} ms, {:?}, confidence {:.2})",
                        job.audio_path.display(),
                        r.detected_gap_ms,
                        r.expected_gap_ms,
                        r.status,
                        r.confidence
                    );
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: ERROR {}", job.audio_path.display(), e);
            }
        }
    }

    eprintln!(
        "Done: {} songs in {:.2} s, {} mismatched, {} failed",
        songs.len(),
        t0.elapsed().as_secs_f64(),
        mismatches,
        failures
    );

    Ok(())
}
