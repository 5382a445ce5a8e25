//! Evaluation and dataset-loading configuration.
//!
//! Both structs are plain values passed into every call that needs them; they
//! are cloned into parallel workers and never mutated during a run.

use serde::{Deserialize, Serialize};

use crate::annotation::{BoxAnnotation, ObjectClass};
use crate::distances::DistanceMode;
use crate::{Error, Result};

/// When a resumed track counts as a fragmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentationRule {
    /// Only a track that was matched before the gap can fragment.
    #[default]
    AfterFirstMatch,
    /// A first match that follows unmatched visible frames also counts.
    AfterFirstVisible,
}

/// Configuration of the association engine and the metric thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Geometric distance between a ground-truth box and a hypothesis box.
    pub distance_mode: DistanceMode,

    /// Pairs whose distance is not strictly below this value cannot match.
    pub max_distance: f64,

    /// Cost bonus given to pairs that were matched in the previous frame.
    pub continuity_epsilon: f64,

    pub fragmentation_rule: FragmentationRule,

    /// Minimum matched fraction of a track to count as mostly tracked.
    pub mostly_tracked_ratio: f64,

    /// Maximum matched fraction of a track to count as mostly lost.
    pub mostly_lost_ratio: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            distance_mode: DistanceMode::Iou,
            max_distance: 0.5,
            continuity_epsilon: 1e-6,
            fragmentation_rule: FragmentationRule::AfterFirstMatch,
            mostly_tracked_ratio: 0.8,
            mostly_lost_ratio: 0.2,
        }
    }
}

impl EvalConfig {
    /// Create a configuration for the given distance mode and threshold.
    pub fn new(distance_mode: DistanceMode, max_distance: f64) -> Self {
        Self {
            distance_mode,
            max_distance,
            ..Self::default()
        }
    }

    /// Check that thresholds are usable before an evaluation run starts.
    pub fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_distance must be positive and finite, got {}",
                self.max_distance
            )));
        }

        if !self.continuity_epsilon.is_finite() || self.continuity_epsilon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "continuity_epsilon must be non-negative, got {}",
                self.continuity_epsilon
            )));
        }

        if self.continuity_epsilon >= self.max_distance {
            return Err(Error::InvalidConfig(
                "continuity_epsilon must be smaller than max_distance".to_string(),
            ));
        }

        let ratios_ok = (0.0..=1.0).contains(&self.mostly_lost_ratio)
            && (0.0..=1.0).contains(&self.mostly_tracked_ratio)
            && self.mostly_lost_ratio < self.mostly_tracked_ratio;
        if !ratios_ok {
            return Err(Error::InvalidConfig(format!(
                "track ratios must satisfy 0 <= mostly_lost ({}) < mostly_tracked ({}) <= 1",
                self.mostly_lost_ratio, self.mostly_tracked_ratio
            )));
        }

        Ok(())
    }
}

/// Filters applied by the dataset loader to ground-truth rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Ground-truth boxes less visible than this are dropped.
    pub min_visibility: f64,

    /// Ground-truth classes that are scored.
    pub evaluated_classes: Vec<ObjectClass>,

    /// Drop ground-truth rows whose "consider" flag is zero.
    pub drop_ignored: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.0,
            evaluated_classes: vec![ObjectClass::Pedestrian],
            drop_ignored: true,
        }
    }
}

impl LoaderConfig {
    /// Whether a ground-truth row survives the filters.
    pub fn keeps(&self, annotation: &BoxAnnotation) -> bool {
        if self.drop_ignored && annotation.confidence == 0.0 {
            return false;
        }
        if annotation.visibility < self.min_visibility {
            return false;
        }
        self.evaluated_classes.is_empty() || self.evaluated_classes.contains(&annotation.class)
    }
}
