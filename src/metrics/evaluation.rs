//! MOTChallenge evaluation functions.

use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{AccumulatorTotals, MotAccumulator};
use crate::annotation::Frame;
use crate::config::{EvalConfig, LoaderConfig};
use crate::dataset::{AnnotationFile, AnnotationKind, DatasetLoader, SequenceLoader};
use crate::Result;

/// CLEAR-MOT metrics derived from accumulator totals.
///
/// Ratios whose denominator is zero are `None` rather than zero, so "no data"
/// stays distinct from "perfectly bad".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotMetrics {
    pub num_frames: u64,
    /// Ground-truth boxes (G)
    pub num_objects: u64,
    pub num_matches: u64,
    pub num_false_positives: u64,
    /// Number of false negatives (misses)
    pub num_misses: u64,
    /// Number of ID switches
    pub num_switches: u64,
    pub num_fragmentations: u64,
    /// Number of unique ground truth IDs
    pub num_unique_objects: u64,
    pub mostly_tracked: u64,
    pub partially_tracked: u64,
    pub mostly_lost: u64,
    /// Multi-Object Tracking Accuracy, may be negative
    pub mota: Option<f64>,
    /// Multi-Object Tracking Precision, mean distance of matched pairs
    pub motp: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
}

fn ratio(numerator: f64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator / denominator as f64)
}

impl MotMetrics {
    /// Compute the metric set of some totals.
    pub fn from_totals(totals: &AccumulatorTotals) -> Self {
        let tp = totals.num_matches;
        let fp = totals.num_false_positives;
        let fn_ = totals.num_misses;
        let errors = (fn_ + fp + totals.num_switches) as f64;

        Self {
            num_frames: totals.num_frames,
            num_objects: totals.num_objects,
            num_matches: tp,
            num_false_positives: fp,
            num_misses: fn_,
            num_switches: totals.num_switches,
            num_fragmentations: totals.num_fragmentations,
            num_unique_objects: totals.num_unique_objects,
            mostly_tracked: totals.mostly_tracked,
            partially_tracked: totals.partially_tracked,
            mostly_lost: totals.mostly_lost,
            mota: ratio(errors, totals.num_objects).map(|e| 1.0 - e),
            motp: ratio(totals.total_distance, tp),
            precision: ratio(tp as f64, tp + fp),
            recall: ratio(tp as f64, tp + fn_),
        }
    }
}

/// Totals and metrics of one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceEvaluation {
    pub name: String,
    pub totals: AccumulatorTotals,
    pub metrics: MotMetrics,
}

impl SequenceEvaluation {
    pub fn new(name: impl Into<String>, totals: AccumulatorTotals) -> Self {
        let metrics = MotMetrics::from_totals(&totals);
        Self {
            name: name.into(),
            totals,
            metrics,
        }
    }
}

/// A sequence that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFailure {
    pub name: String,
    pub reason: String,
}

/// Result of a whole benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub config: EvalConfig,
    pub sequences: Vec<SequenceEvaluation>,
    pub failures: Vec<SequenceFailure>,
    /// Sum of the totals of all evaluated sequences, metrics recomputed once.
    pub overall: SequenceEvaluation,
}

impl BenchmarkReport {
    pub fn new(config: EvalConfig, sequences: Vec<SequenceEvaluation>, failures: Vec<SequenceFailure>) -> Self {
        let totals: AccumulatorTotals = sequences.iter().map(|s| &s.totals).sum();
        Self {
            config,
            sequences,
            failures,
            overall: SequenceEvaluation::new("OVERALL", totals),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Accumulate a sequence of frames with a fresh accumulator.
pub fn evaluate_frames<I>(frames: I, config: &EvalConfig) -> Result<AccumulatorTotals>
where
    I: IntoIterator<Item = Frame>,
{
    config.validate()?;
    let mut acc = MotAccumulator::new(config.clone());
    for frame in frames {
        acc.update_frame(&frame)?;
    }
    Ok(acc.finalize())
}

/// Evaluate tracker output against the ground truth of a loaded sequence.
///
/// Every frame `1..=seqLength` is evaluated; hypotheses outside that range are ignored.
pub fn evaluate_sequence(
    seq: &SequenceLoader,
    predictions: &AnnotationFile,
    config: &EvalConfig,
) -> Result<SequenceEvaluation> {
    if let Some(last) = predictions.last_frame() {
        if last > seq.num_frames() {
            warn!(
                "{}: predictions beyond frame {} are ignored",
                seq.name(),
                seq.num_frames()
            );
        }
    }

    let frames = seq
        .frames()
        .map(|(index, ground_truth)| {
            Frame::new(index, ground_truth.to_vec(), predictions.frame(index).to_vec())
        })
        .collect::<Result<Vec<Frame>>>()?;

    let totals = evaluate_frames(frames, config)?;
    Ok(SequenceEvaluation::new(seq.name(), totals))
}

fn evaluate_sequence_dir(
    dir: &Path,
    predictions_dir: &Path,
    eval_config: &EvalConfig,
    loader_config: &LoaderConfig,
) -> Result<SequenceEvaluation> {
    let seq = SequenceLoader::open(dir, loader_config)?;
    let predictions_path = predictions_dir.join(format!("{}.txt", seq.name()));
    let predictions = AnnotationFile::read(&predictions_path, AnnotationKind::Hypothesis, None)?;
    evaluate_sequence(&seq, &predictions, eval_config)
}

/// Evaluate MOT challenge results.
///
/// # Arguments
/// * `dataset_root` - Directory holding sequences, directly or under split folders
/// * `predictions_dir` - Directory holding one `<sequence name>.txt` per sequence
/// * `eval_config` - Matching and metric configuration
/// * `loader_config` - Ground-truth filters
///
/// # Returns
/// Per-sequence results, failed sequences and the overall aggregate. Only an
/// invalid configuration or an unreadable dataset root is an error.
pub fn eval_mot_challenge<P1: AsRef<Path>, P2: AsRef<Path>>(
    dataset_root: P1,
    predictions_dir: P2,
    eval_config: &EvalConfig,
    loader_config: &LoaderConfig,
) -> Result<BenchmarkReport> {
    eval_config.validate()?;

    let predictions_dir = predictions_dir.as_ref();
    let loader = DatasetLoader::new(dataset_root, loader_config.clone());
    let dirs = loader.sequence_dirs()?;
    info!(
        "evaluating {} sequences from {}",
        dirs.len(),
        loader.root().display()
    );

    let outcomes: Vec<std::result::Result<SequenceEvaluation, SequenceFailure>> = dirs
        .par_iter()
        .map(|dir| {
            evaluate_sequence_dir(dir, predictions_dir, eval_config, loader.config()).map_err(|e| {
                SequenceFailure {
                    name: dir
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| dir.display().to_string()),
                    reason: e.to_string(),
                }
            })
        })
        .collect();

    let mut sequences = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(evaluation) => {
                info!(
                    "{}: {} frames, MOTA {}",
                    evaluation.name,
                    evaluation.metrics.num_frames,
                    format_metric(evaluation.metrics.mota)
                );
                sequences.push(evaluation);
            }
            Err(failure) => {
                warn!("{}: evaluation failed: {}", failure.name, failure.reason);
                failures.push(failure);
            }
        }
    }

    Ok(BenchmarkReport::new(eval_config.clone(), sequences, failures))
}

fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| format!("{:.3}", v))
}
