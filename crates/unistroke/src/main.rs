//! unistroke: merge disjoint paths into one continuous stroke.
//!
//! Reads a `{"paths": [...]}` JSON document, unifies every path into a
//! single polyline that never lifts the pen, and writes a `{"path": [...]}`
//! document. Optional exports render the result for previewing (SVG),
//! for the Etch-A-Sketch emulator (command JSON), or for polar sand
//! tables (THR). Per-stage diagnostics help when tuning large inputs.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin unistroke -- [OPTIONS] <INPUT> <OUTPUT>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use unistroke_core::diagnostics::{Clock, UnifyDiagnostics};
use unistroke_core::{PathDocument, PathsDocument, UnifyConfig, UnifyResult};
use unistroke_export::{EtchOptions, SvgMetadata, ThrMetadata};

/// Merge disjoint line paths into a single continuous stroke.
///
/// Every input segment is drawn; gaps between paths are bridged by the
/// shortest available connectors, retraced on the way back.
#[derive(Parser)]
#[command(name = "unistroke", version)]
struct Cli {
    /// Input JSON document (`{"paths": [[{"x": .., "y": ..}, ..], ..]}`).
    input: PathBuf,

    /// Output JSON document (`{"path": [..]}`).
    output: PathBuf,

    /// Pen moves no longer than this are skipped.
    #[arg(long, default_value_t = UnifyConfig::DEFAULT_MOVE_EPSILON)]
    move_epsilon: f64,

    /// Retrace back to the first point so the path ends where it began.
    #[arg(long)]
    return_to_start: bool,

    /// Full unify config as a JSON string.
    ///
    /// When provided, `--move-epsilon` and `--return-to-start` are
    /// ignored. The JSON must be a valid `UnifyConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write an SVG preview of the unified path.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write an SVG with every connective jump highlighted.
    #[arg(long)]
    diagnostic_svg: Option<PathBuf>,

    /// Write an Etch-A-Sketch emulator command file.
    #[arg(long)]
    etch: Option<PathBuf>,

    /// Etch drawing area width.
    #[arg(long, default_value_t = EtchOptions::DEFAULT_ETCH_WIDTH)]
    etch_width: f64,

    /// Etch drawing area height.
    #[arg(long, default_value_t = EtchOptions::DEFAULT_ETCH_HEIGHT)]
    etch_height: f64,

    /// Etch stylus radius.
    #[arg(long, default_value_t = EtchOptions::DEFAULT_POINTER_RADIUS)]
    pointer_radius: f64,

    /// Border kept clear when fitting into the etch area.
    #[arg(long, default_value_t = 0.0)]
    etch_margin: f64,

    /// Emit etch coordinates unchanged instead of fitting them.
    #[arg(long)]
    no_fit: bool,

    /// Write a THR (theta-rho) file for polar sand tables.
    #[arg(long)]
    thr: Option<PathBuf>,

    /// Print the per-stage diagnostics report.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON instead of the human-readable report.
    #[arg(long)]
    json: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,
}

/// Build a [`UnifyConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<UnifyConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        UnifyConfig {
            move_epsilon: cli.move_epsilon,
            return_to_start: cli.return_to_start,
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

const fn etch_options_from_cli(cli: &Cli) -> EtchOptions {
    EtchOptions {
        etch_width: cli.etch_width,
        etch_height: cli.etch_height,
        pointer_radius: cli.pointer_radius,
        fit: !cli.no_fit,
        margin: cli.etch_margin,
    }
}

fn read_document(path: &Path) -> Result<PathsDocument, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn write_file(path: &Path, contents: &str, what: &str) -> Result<(), String> {
    std::fs::write(path, contents)
        .map_err(|e| format!("Error writing {what} to {}: {e}", path.display()))?;
    eprintln!(
        "{what} written to {} ({} bytes)",
        path.display(),
        contents.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;
    let document = read_document(&cli.input)?;

    eprintln!(
        "Input: {} ({} paths)",
        cli.input.display(),
        document.paths.len()
    );
    eprintln!("Config: {config:#?}");
    if cli.runs > 1 {
        eprintln!("Runs: {}", cli.runs);
    }
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    let mut first_result = None;

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let (result, diagnostics) = unistroke_core::unify_with_diagnostics(
            document.clone(),
            config.clone(),
            &StdClock,
        )
        .map_err(|e| format!("Unify error: {e}"))?;

        if cli.json {
            let json = serde_json::to_string_pretty(&diagnostics)
                .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
            println!("{json}");
        } else if cli.diagnostics {
            println!("{}", diagnostics.report());
        }

        if first_result.is_none() {
            first_result = Some(result);
        }
        all_diagnostics.push(diagnostics);
    }

    if cli.runs > 1 && (cli.diagnostics || cli.json) {
        print_multi_run_summary(&all_diagnostics);
    }

    let Some(result) = first_result else {
        return Err("no runs performed".to_owned());
    };
    write_outputs(cli, &config, &result)
}

/// Write the unified document and every requested export.
fn write_outputs(cli: &Cli, config: &UnifyConfig, result: &UnifyResult) -> Result<(), String> {
    let output = PathDocument {
        path: result.path.clone(),
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("Error serializing output: {e}"))?;
    write_file(&cli.output, &json, "Path")?;

    let title = cli
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unistroke");
    let config_json = serde_json::to_string(config)
        .map_err(|e| format!("Error serializing config: {e}"))?;

    if cli.svg.is_some() || cli.diagnostic_svg.is_some() {
        let metadata = SvgMetadata {
            title: Some(title),
            description: None,
            config_json: Some(&config_json),
        };
        if let Some(ref svg_path) = cli.svg {
            let svg = unistroke_export::to_svg(&result.path, &metadata);
            write_file(svg_path, &svg, "SVG")?;
        }
        if let Some(ref svg_path) = cli.diagnostic_svg {
            let svg =
                unistroke_export::to_diagnostic_svg(&result.path, &result.transitions, &metadata);
            write_file(svg_path, &svg, "Diagnostic SVG")?;
        }
    }

    if let Some(ref etch_path) = cli.etch {
        let etch = unistroke_export::to_etch_json(&result.path, &etch_options_from_cli(cli))
            .map_err(|e| format!("Etch export error: {e}"))?;
        write_file(etch_path, &etch, "Etch commands")?;
    }

    if let Some(ref thr_path) = cli.thr {
        let metadata = ThrMetadata {
            title: Some(title),
            description: None,
            config_json: Some(&config_json),
        };
        let thr = unistroke_export::to_thr(&result.path, &metadata, None);
        write_file(thr_path, &thr, "THR")?;
    }

    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&UnifyDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[UnifyDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Segmentation", |d| d.segmentation.duration),
        ("BVH Build", |d| d.bvh_build.duration),
        ("Spanning Tree", |d| d.spanning_tree.duration),
        ("Linearize", |d| d.linearize.duration),
    ];

    for (name, extractor) in stage_extractors {
        let total: f64 = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum();
        let stage_mean = total / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
