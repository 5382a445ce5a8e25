//! CLEAR-MOT metrics.
//!
//! This module provides:
//!
//! - `MotAccumulator` - per-sequence counts of matches, misses, false positives,
//!   ID switches and fragmentations
//! - `MotMetrics` - MOTA, MOTP, precision and recall derived from the counts
//! - `eval_mot_challenge` - evaluates a MOTChallenge dataset against tracker output

mod accumulator;
mod evaluation;

pub use accumulator::{AccumulatorTotals, MotAccumulator, TrackClass, TrackState};
pub use evaluation::{
    eval_mot_challenge, evaluate_frames, evaluate_sequence, BenchmarkReport, MotMetrics,
    SequenceEvaluation, SequenceFailure,
};
