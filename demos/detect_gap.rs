//! Example: Detect the vocal gap of a single song
//!
//! Usage:
//!   cargo run --release --example detect_gap -- [--silence] [--overwrite] [--json] <vocals.wav> <stored_gap_ms>
//!
//! The input is an already separated vocals stem. `--silence` uses full-track
//! silence detection instead of the windowed scan.

use std::env;
use std::path::PathBuf;
use vocal_gap::{
    perform, GapConfig, GapResult, ScanningProvider, SilenceDetectProvider, StemFileBackend,
};

fn print_result(result: &GapResult) {
    println!("Gap Detection Results:");
    println!(
        "  Detected gap: {:.0} ms (stored: {} ms, {:+.0} ms)",
        result.detected_gap_ms,
        result.expected_gap_ms,
        result.difference_ms()
    );
    println!("  Status: {:?}", result.status);
    println!(
        "  Confidence: {:.2} ({})",
        result.confidence,
        result.confidence_level()
    );
    println!("  Silence periods: {}", result.silence_periods.len());
    for period in &result.silence_periods {
        println!("    {:>9.0} - {:>9.0} ms", period.start_ms, period.end_ms);
    }
    println!(
        "  Provider: {} ({:.2} ms)",
        result.metadata.provider, result.metadata.processing_time_ms
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut silence = false;
    let mut json = false;
    let mut config = GapConfig::default();
    let mut positional: Vec<String> = Vec::new();

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--silence" => silence = true,
            "--overwrite" => config.overwrite = true,
            "--json" => json = true,
            "--help" | "-h" => {
                eprintln!(
                    "Usage: detect_gap [--silence] [--overwrite] [--json] <vocals.wav> <stored_gap_ms>"
                );
                return Ok(());
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        eprintln!("ERROR: Expected <vocals.wav> <stored_gap_ms>. Use --help for usage.");
        std::process::exit(2);
    }

    let path = PathBuf::from(&positional[0]);
    let expected_gap_ms: u64 = positional[1].parse()?;

    let result = if silence {
        config.method = "silence".to_string();
        let mut provider = SilenceDetectProvider::from_config(StemFileBackend::new(), &config);
        perform(&path, expected_gap_ms, &config, &mut provider)?
    } else {
        let mut provider = ScanningProvider::from_config(StemFileBackend::new(), &config);
        let result = perform(&path, expected_gap_ms, &config, &mut provider)?;
        if let Some(scan) = provider.last_scan() {
            eprintln!(
                "Scan: {:?} after {} iterations, {} ranges separated",
                scan.state,
                scan.iterations,
                provider.cache().misses()
            );
        }
        result
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}
