use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Deserialize;

use clearmot_rs::{eval_mot_challenge, DistanceMode, EvalConfig, LoaderConfig};

/// CLEAR-MOT evaluation of tracker output on a MOTChallenge dataset.
#[derive(Parser)]
#[command(name = "mot-eval", version)]
struct Cli {
    /// Dataset root holding sequence directories (directly or under train/ and test/).
    dataset_root: PathBuf,

    /// Directory with one <sequence name>.txt tracker output per sequence.
    predictions_dir: PathBuf,

    /// JSON configuration file with optional "eval" and "loader" sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Box distance: iou or euclidean.
    #[arg(long)]
    distance: Option<DistanceMode>,

    /// Pairs at or above this distance never match.
    #[arg(long)]
    max_distance: Option<f64>,

    /// Ground-truth boxes less visible than this are not scored (0.0-1.0).
    #[arg(long)]
    min_visibility: Option<f64>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    eval: EvalConfig,
    loader: LoaderConfig,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns whether every sequence was evaluated.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut file_config = match &cli.config {
        Some(path) => serde_json::from_str::<FileConfig>(&fs::read_to_string(path)?)?,
        None => FileConfig::default(),
    };

    if let Some(distance) = cli.distance {
        file_config.eval.distance_mode = distance;
    }
    if let Some(max_distance) = cli.max_distance {
        file_config.eval.max_distance = max_distance;
    }
    if let Some(min_visibility) = cli.min_visibility {
        file_config.loader.min_visibility = min_visibility;
    }

    let report = eval_mot_challenge(
        &cli.dataset_root,
        &cli.predictions_dir,
        &file_config.eval,
        &file_config.loader,
    )?;

    let json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => fs::write(path, json + "\n")?,
        None => writeln!(std::io::stdout().lock(), "{json}")?,
    }

    for failure in &report.failures {
        eprintln!("Failed: {}: {}", failure.name, failure.reason);
    }

    Ok(!report.has_failures())
}
