//! Ground-truth-to-hypothesis matching for a single frame.

use std::collections::HashSet;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::annotation::{Frame, FrameIndex, ObjectId};
use crate::config::EvalConfig;
use crate::distances::distance_matrix;
use crate::internal::scipy::linear_sum_assignment;
use crate::{Error, Result};

/// A ground-truth object matched to a hypothesis in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub ground_truth_id: ObjectId,
    pub hypothesis_id: ObjectId,
    /// Unadjusted geometric distance of the pair.
    pub distance: f64,
}

/// Matching result of one frame.
///
/// A partial bijection between ground-truth and hypothesis ids, plus the ids
/// left unmatched on either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMatch {
    frame: FrameIndex,
    pairs: Vec<MatchedPair>,
    unmatched_ground_truth: Vec<ObjectId>,
    unmatched_hypotheses: Vec<ObjectId>,
}

impl FrameMatch {
    /// Build a frame match, checking that no id appears twice.
    ///
    /// Pairs are ordered by ground-truth id and unmatched ids ascending.
    pub fn new(
        frame: FrameIndex,
        mut pairs: Vec<MatchedPair>,
        mut unmatched_ground_truth: Vec<ObjectId>,
        mut unmatched_hypotheses: Vec<ObjectId>,
    ) -> Result<Self> {
        let mut gt_seen = HashSet::new();
        let mut hyp_seen = HashSet::new();

        let gt_ids = pairs
            .iter()
            .map(|p| p.ground_truth_id)
            .chain(unmatched_ground_truth.iter().copied());
        for id in gt_ids {
            if !gt_seen.insert(id) {
                return Err(Error::MalformedFrame(format!(
                    "ground truth id {} used twice in match of frame {}",
                    id, frame
                )));
            }
        }

        let hyp_ids = pairs
            .iter()
            .map(|p| p.hypothesis_id)
            .chain(unmatched_hypotheses.iter().copied());
        for id in hyp_ids {
            if !hyp_seen.insert(id) {
                return Err(Error::MalformedFrame(format!(
                    "hypothesis id {} used twice in match of frame {}",
                    id, frame
                )));
            }
        }

        pairs.sort_by_key(|p| p.ground_truth_id);
        unmatched_ground_truth.sort_unstable();
        unmatched_hypotheses.sort_unstable();

        Ok(Self {
            frame,
            pairs,
            unmatched_ground_truth,
            unmatched_hypotheses,
        })
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Matched pairs (true positives), ordered by ground-truth id.
    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    /// Ground-truth ids without a hypothesis (misses).
    pub fn unmatched_ground_truth(&self) -> &[ObjectId] {
        &self.unmatched_ground_truth
    }

    /// Hypothesis ids without a ground truth (false positives).
    pub fn unmatched_hypotheses(&self) -> &[ObjectId] {
        &self.unmatched_hypotheses
    }

    /// Number of ground-truth objects of the frame.
    pub fn num_ground_truth(&self) -> usize {
        self.pairs.len() + self.unmatched_ground_truth.len()
    }

    pub fn num_hypotheses(&self) -> usize {
        self.pairs.len() + self.unmatched_hypotheses.len()
    }

    pub fn hypothesis_for(&self, ground_truth_id: ObjectId) -> Option<ObjectId> {
        self.pairs
            .binary_search_by_key(&ground_truth_id, |p| p.ground_truth_id)
            .ok()
            .map(|idx| self.pairs[idx].hypothesis_id)
    }

    pub fn ground_truth_for(&self, hypothesis_id: ObjectId) -> Option<ObjectId> {
        self.pairs
            .iter()
            .find(|p| p.hypothesis_id == hypothesis_id)
            .map(|p| p.ground_truth_id)
    }
}

/// Match the ground truth of a frame to its hypotheses.
///
/// # Arguments
/// * `frame` - Ground truth and hypotheses of the current frame
/// * `previous` - Match of the previous frame, if any
/// * `config` - Distance mode, threshold and continuity bonus
///
/// Pairs at or beyond `config.max_distance` are forbidden. Pairs that were
/// matched in `previous` and are still allowed get their cost lowered by
/// `config.continuity_epsilon`, which settles ties in favour of keeping
/// identities without overriding a strictly better geometric match.
pub fn match_frame(frame: &Frame, previous: Option<&FrameMatch>, config: &EvalConfig) -> FrameMatch {
    let ground_truth = frame.ground_truth();
    let hypotheses = frame.hypotheses();

    let distances = distance_matrix(config.distance_mode, ground_truth, hypotheses);
    let mut costs = distances.clone();

    if let Some(previous) = previous {
        apply_continuity(&mut costs, frame, previous, config);
    }

    let result = linear_sum_assignment(&costs, config.max_distance);

    let pairs = result
        .assignments
        .iter()
        .map(|a| MatchedPair {
            ground_truth_id: ground_truth[a.row_idx].id,
            hypothesis_id: hypotheses[a.col_idx].id,
            distance: distances[(a.row_idx, a.col_idx)],
        })
        .collect();

    // Rows and columns follow the id-sorted order of the frame, so every
    // output list is already sorted.
    FrameMatch {
        frame: frame.index(),
        pairs,
        unmatched_ground_truth: result
            .unmatched_rows
            .iter()
            .map(|&i| ground_truth[i].id)
            .collect(),
        unmatched_hypotheses: result
            .unmatched_cols
            .iter()
            .map(|&j| hypotheses[j].id)
            .collect(),
    }
}

fn apply_continuity(
    costs: &mut DMatrix<f64>,
    frame: &Frame,
    previous: &FrameMatch,
    config: &EvalConfig,
) {
    let hypotheses = frame.hypotheses();
    for (i, gt) in frame.ground_truth().iter().enumerate() {
        let Some(prev_hyp) = previous.hypothesis_for(gt.id) else {
            continue;
        };
        let Ok(j) = hypotheses.binary_search_by_key(&prev_hyp, |h| h.id) else {
            continue;
        };
        if costs[(i, j)] < config.max_distance {
            costs[(i, j)] -= config.continuity_epsilon;
        }
    }
}
