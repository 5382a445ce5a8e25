//! # clearmot-rs - CLEAR-MOT evaluation
//!
//! Frame-by-frame association and accumulation engine for evaluating
//! multi-object trackers on MOTChallenge-style datasets.
//!
//! ## Features
//!
//! - `1 - IoU` and normalised centre distances between boxes
//! - Exact minimum-cost assignment under a distance threshold
//! - Identity continuity across frames, ID switch and fragmentation counting
//! - MOTA, MOTP, precision, recall and mostly-tracked / mostly-lost classes
//! - MOTChallenge dataset loading and parallel benchmark evaluation
//!
//! ## Example
//!
//! ```rust
//! use clearmot_rs::{BoxAnnotation, EvalConfig, Frame, MotAccumulator, MotMetrics};
//!
//! let mut acc = MotAccumulator::new(EvalConfig::default());
//!
//! let gt = vec![BoxAnnotation::new(1, 1, 10.0, 10.0, 20.0, 40.0)];
//! let hyp = vec![BoxAnnotation::new(7, 1, 11.0, 10.0, 20.0, 40.0)];
//! acc.update_frame(&Frame::new(1, gt, hyp).unwrap()).unwrap();
//!
//! let metrics = MotMetrics::from_totals(&acc.finalize());
//! assert_eq!(metrics.num_matches, 1);
//! assert_eq!(metrics.mota, Some(1.0));
//! ```

// Internal modules (port of scipy's assignment solver)
pub(crate) mod internal;

// Public modules
pub mod annotation;
pub mod config;
pub mod dataset;
pub mod distances;
pub mod matching;
pub mod metrics;

// Optional modules
#[cfg(feature = "python")]
pub mod python;

// Re-exports for convenience
pub use annotation::{BoxAnnotation, Frame, FrameIndex, ObjectClass, ObjectId};
pub use config::{EvalConfig, FragmentationRule, LoaderConfig};
pub use dataset::{AnnotationFile, AnnotationKind, DatasetLoader, SequenceLoader};
pub use distances::{distance_matrix, distance_mode_by_name, DistanceMode};
pub use internal::scipy::{linear_sum_assignment, Assignment, AssignmentResult};
pub use matching::{match_frame, FrameMatch, MatchedPair};
pub use metrics::{
    eval_mot_challenge, AccumulatorTotals, BenchmarkReport, MotAccumulator, MotMetrics,
};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur during an evaluation
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Malformed frame: {0}")]
        MalformedFrame(String),

        #[error("Out-of-order frame: got {got} after {last}")]
        OutOfOrderFrame { last: i64, got: i64 },

        #[error("Unknown distance function: {0}")]
        UnknownDistance(String),

        #[error("Parse error in {path} line {line}: {message}")]
        Parse {
            path: String,
            line: usize,
            message: String,
        },

        #[error("Dataset error: {0}")]
        Dataset(String),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),
    }

    /// Result type for clearmot operations
    pub type Result<T> = std::result::Result<T, Error>;
}
