//! MOT metrics accumulator.
//!
//! Consumes frame matches in frame order, tracks the match history of every
//! ground-truth object and keeps the additive CLEAR-MOT counts.

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::annotation::{Frame, FrameIndex, ObjectId};
use crate::config::{EvalConfig, FragmentationRule};
use crate::matching::{match_frame, FrameMatch};
use crate::{Error, Result};

/// Track completeness class of a ground-truth object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackClass {
    MostlyTracked,
    PartiallyTracked,
    MostlyLost,
}

/// Match history of one ground-truth object.
///
/// Only frames in which the object is present in the ground truth count; a
/// frame where it is absent neither extends nor interrupts a gap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    /// Hypothesis of the most recent match
    pub last_hypothesis: Option<ObjectId>,
    /// Frames in which the object was present
    pub visible_frames: u64,
    /// Frames in which the object was matched
    pub matched_frames: u64,
    /// Consecutive visible frames without a match, up to now
    pub unmatched_run: u64,
}

impl TrackState {
    /// Fraction of visible frames in which the object was matched.
    pub fn coverage(&self) -> f64 {
        if self.visible_frames == 0 {
            0.0
        } else {
            self.matched_frames as f64 / self.visible_frames as f64
        }
    }

    pub fn ever_matched(&self) -> bool {
        self.matched_frames > 0
    }

    /// Classify the track by its coverage.
    pub fn classify(&self, config: &EvalConfig) -> TrackClass {
        let coverage = self.coverage();
        if coverage >= config.mostly_tracked_ratio {
            TrackClass::MostlyTracked
        } else if coverage <= config.mostly_lost_ratio {
            TrackClass::MostlyLost
        } else {
            TrackClass::PartiallyTracked
        }
    }
}

/// Running counts of a sequence (or of several sequences summed together).
///
/// All counts except the three track classes are additive across frames and
/// sequences. The track classes are computed per sequence and summed as counts
/// of tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorTotals {
    pub num_frames: u64,
    /// Ground-truth boxes seen (G)
    pub num_objects: u64,
    /// True positives
    pub num_matches: u64,
    pub num_false_positives: u64,
    /// False negatives
    pub num_misses: u64,
    pub num_switches: u64,
    pub num_fragmentations: u64,
    /// Sum of distances over all matched pairs
    pub total_distance: f64,
    /// Distinct ground-truth identities
    pub num_unique_objects: u64,
    pub mostly_tracked: u64,
    pub partially_tracked: u64,
    pub mostly_lost: u64,
}

impl AddAssign<&AccumulatorTotals> for AccumulatorTotals {
    fn add_assign(&mut self, other: &AccumulatorTotals) {
        self.num_frames += other.num_frames;
        self.num_objects += other.num_objects;
        self.num_matches += other.num_matches;
        self.num_false_positives += other.num_false_positives;
        self.num_misses += other.num_misses;
        self.num_switches += other.num_switches;
        self.num_fragmentations += other.num_fragmentations;
        self.total_distance += other.total_distance;
        self.num_unique_objects += other.num_unique_objects;
        self.mostly_tracked += other.mostly_tracked;
        self.partially_tracked += other.partially_tracked;
        self.mostly_lost += other.mostly_lost;
    }
}

impl AddAssign for AccumulatorTotals {
    fn add_assign(&mut self, other: AccumulatorTotals) {
        *self += &other;
    }
}

impl Add for AccumulatorTotals {
    type Output = AccumulatorTotals;

    fn add(mut self, other: AccumulatorTotals) -> AccumulatorTotals {
        self += &other;
        self
    }
}

impl Sum for AccumulatorTotals {
    fn sum<I: Iterator<Item = AccumulatorTotals>>(iter: I) -> Self {
        iter.fold(AccumulatorTotals::default(), Add::add)
    }
}

impl<'a> Sum<&'a AccumulatorTotals> for AccumulatorTotals {
    fn sum<I: Iterator<Item = &'a AccumulatorTotals>>(iter: I) -> Self {
        iter.fold(AccumulatorTotals::default(), |mut acc, t| {
            acc += t;
            acc
        })
    }
}

/// Accumulator for MOT (Multi-Object Tracking) metrics of one sequence.
///
/// Frames must be fed in strictly increasing frame order.
#[derive(Debug, Clone)]
pub struct MotAccumulator {
    config: EvalConfig,
    totals: AccumulatorTotals,
    /// Ordered by id so that reporting is reproducible
    tracks: BTreeMap<ObjectId, TrackState>,
    last_frame: Option<FrameIndex>,
    previous: Option<FrameMatch>,
}

impl MotAccumulator {
    /// Create a new accumulator.
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            totals: AccumulatorTotals::default(),
            tracks: BTreeMap::new(),
            last_frame: None,
            previous: None,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Index of the last accumulated frame.
    pub fn last_frame(&self) -> Option<FrameIndex> {
        self.last_frame
    }

    /// Match of the last accumulated frame.
    pub fn previous_match(&self) -> Option<&FrameMatch> {
        self.previous.as_ref()
    }

    /// Match a frame against the previous match and accumulate it.
    pub fn update_frame(&mut self, frame: &Frame) -> Result<FrameMatch> {
        self.check_order(frame.index())?;
        let frame_match = match_frame(frame, self.previous.as_ref(), &self.config);
        self.update(&frame_match)?;
        Ok(frame_match)
    }

    /// Accumulate the match of one frame.
    ///
    /// Fails with `OutOfOrderFrame`, leaving the state untouched, if the frame
    /// index is not greater than the last one accumulated.
    pub fn update(&mut self, frame_match: &FrameMatch) -> Result<()> {
        let frame = frame_match.frame();
        self.check_order(frame)?;

        let totals = &mut self.totals;
        totals.num_frames += 1;
        totals.num_objects += frame_match.num_ground_truth() as u64;
        totals.num_matches += frame_match.pairs().len() as u64;
        totals.num_false_positives += frame_match.unmatched_hypotheses().len() as u64;
        totals.num_misses += frame_match.unmatched_ground_truth().len() as u64;

        for pair in frame_match.pairs() {
            totals.total_distance += pair.distance;

            let track = self.tracks.entry(pair.ground_truth_id).or_default();
            track.visible_frames += 1;
            track.matched_frames += 1;

            // Switch: matched before, to a different hypothesis
            if let Some(prev_hyp) = track.last_hypothesis {
                if prev_hyp != pair.hypothesis_id {
                    totals.num_switches += 1;
                    trace!(
                        "frame {}: id switch of object {} ({} -> {})",
                        frame,
                        pair.ground_truth_id,
                        prev_hyp,
                        pair.hypothesis_id
                    );
                }
            }

            // Fragmentation: matched again after visible unmatched frames
            let resumes_gap = track.unmatched_run > 0
                && match self.config.fragmentation_rule {
                    FragmentationRule::AfterFirstMatch => track.last_hypothesis.is_some(),
                    FragmentationRule::AfterFirstVisible => true,
                };
            if resumes_gap {
                totals.num_fragmentations += 1;
                trace!(
                    "frame {}: object {} resumed after {} unmatched frames",
                    frame,
                    pair.ground_truth_id,
                    track.unmatched_run
                );
            }

            track.unmatched_run = 0;
            track.last_hypothesis = Some(pair.hypothesis_id);
        }

        for &gt_id in frame_match.unmatched_ground_truth() {
            let track = self.tracks.entry(gt_id).or_default();
            track.visible_frames += 1;
            track.unmatched_run += 1;
        }

        self.last_frame = Some(frame);
        self.previous = Some(frame_match.clone());
        Ok(())
    }

    fn check_order(&self, frame: FrameIndex) -> Result<()> {
        match self.last_frame {
            Some(last) if frame <= last => Err(Error::OutOfOrderFrame { last, got: frame }),
            _ => Ok(()),
        }
    }

    /// Per-object match history, ordered by ground-truth id.
    pub fn track_states(&self) -> &BTreeMap<ObjectId, TrackState> {
        &self.tracks
    }

    /// Current totals, with track classes computed from the current histories.
    pub fn totals(&self) -> AccumulatorTotals {
        let mut totals = self.totals.clone();
        totals.num_unique_objects = self.tracks.len() as u64;

        for track in self.tracks.values() {
            match track.classify(&self.config) {
                TrackClass::MostlyTracked => totals.mostly_tracked += 1,
                TrackClass::PartiallyTracked => totals.partially_tracked += 1,
                TrackClass::MostlyLost => totals.mostly_lost += 1,
            }
        }

        totals
    }

    /// Close the sequence and return its final totals.
    pub fn finalize(self) -> AccumulatorTotals {
        let totals = self.totals();
        debug!(
            "finalized {} frames: {} objects, {} matches, {} fp, {} misses, {} switches, {} fragmentations",
            totals.num_frames,
            totals.num_objects,
            totals.num_matches,
            totals.num_false_positives,
            totals.num_misses,
            totals.num_switches,
            totals.num_fragmentations
        );
        totals
    }
}
