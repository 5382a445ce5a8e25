//! Geometric distances between ground-truth and hypothesis boxes.
//!
//! This module provides:
//! - `DistanceMode` - enum dispatch over the supported box distances
//! - `distance_matrix` - the ground truth x hypotheses cost matrix of a frame
//! - Built-in distance functions (`iou_distance`, `center_distance`)

mod functions;

pub use functions::*;

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::annotation::BoxAnnotation;
use crate::{Error, Result};

/// Box distance used for the whole evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    /// `1 - IoU` of the two boxes.
    #[default]
    Iou,
    /// Centre distance divided by the ground-truth diagonal.
    Euclidean,
}

impl DistanceMode {
    /// Distance between one ground-truth box and one hypothesis box.
    #[inline(always)]
    pub fn distance(&self, ground_truth: &BoxAnnotation, hypothesis: &BoxAnnotation) -> f64 {
        match self {
            DistanceMode::Iou => iou_distance(ground_truth, hypothesis),
            DistanceMode::Euclidean => center_distance(ground_truth, hypothesis),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMode::Iou => "iou",
            DistanceMode::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        distance_mode_by_name(s)
    }
}

/// Get a distance mode by name.
///
/// Supported names:
/// - "iou" - `1 - IoU`
/// - "euclidean" (alias "center") - normalised centre distance
pub fn distance_mode_by_name(name: &str) -> Result<DistanceMode> {
    match name.trim().to_ascii_lowercase().as_str() {
        "iou" => Ok(DistanceMode::Iou),
        "euclidean" | "center" => Ok(DistanceMode::Euclidean),
        _ => Err(Error::UnknownDistance(name.to_string())),
    }
}

/// Full distance matrix of a frame, shape (ground truth, hypotheses).
pub fn distance_matrix(
    mode: DistanceMode,
    ground_truth: &[BoxAnnotation],
    hypotheses: &[BoxAnnotation],
) -> DMatrix<f64> {
    DMatrix::from_fn(ground_truth.len(), hypotheses.len(), |i, j| {
        mode.distance(&ground_truth[i], &hypotheses[j])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_mode_by_name() {
        assert_eq!(distance_mode_by_name("iou").unwrap(), DistanceMode::Iou);
        assert_eq!(distance_mode_by_name("IoU").unwrap(), DistanceMode::Iou);
        assert_eq!(distance_mode_by_name("euclidean").unwrap(), DistanceMode::Euclidean);
        assert_eq!("center".parse::<DistanceMode>().unwrap(), DistanceMode::Euclidean);
    }

    #[test]
    fn test_unknown_distance() {
        let err = distance_mode_by_name("manhattan").unwrap_err();
        assert!(matches!(err, Error::UnknownDistance(name) if name == "manhattan"));
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(DistanceMode::Iou.to_string(), "iou");
        assert_eq!(DistanceMode::Euclidean.to_string(), "euclidean");
    }

    #[test]
    fn test_distance_matrix_shape_and_values() {
        let gt = vec![
            BoxAnnotation::new(1, 1, 0.0, 0.0, 10.0, 10.0),
            BoxAnnotation::new(2, 1, 50.0, 50.0, 10.0, 10.0),
        ];
        let hyp = vec![
            BoxAnnotation::new(7, 1, 50.0, 50.0, 10.0, 10.0),
            BoxAnnotation::new(8, 1, 0.0, 0.0, 10.0, 10.0),
            BoxAnnotation::new(9, 1, 5.0, 5.0, 10.0, 10.0),
        ];

        let matrix = distance_matrix(DistanceMode::Iou, &gt, &hyp);
        assert_eq!(matrix.nrows(), 2);
        assert_eq!(matrix.ncols(), 3);
        assert_relative_eq!(matrix[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix[(0, 1)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(matrix[(1, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(matrix[(0, 2)], 1.0 - 25.0 / 175.0, epsilon = 1e-12);
    }

    #[test]
    fn test_distance_matrix_empty() {
        let gt = vec![BoxAnnotation::new(1, 1, 0.0, 0.0, 10.0, 10.0)];
        let matrix = distance_matrix(DistanceMode::Euclidean, &gt, &[]);
        assert_eq!(matrix.shape(), (1, 0));
    }
}
