//! Bounding-box annotations and per-frame ground-truth / hypothesis sets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identity label of a ground-truth object or a tracker hypothesis.
pub type ObjectId = i64;

/// 1-based frame number, as used in MOTChallenge files.
pub type FrameIndex = i64;

/// Object classes of the MOT16/MOT17 ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Pedestrian,
    PersonOnVehicle,
    Car,
    Bicycle,
    Motorbike,
    NonMotorizedVehicle,
    StaticPerson,
    Distractor,
    Occluder,
    OccluderOnGround,
    OccluderFull,
    Reflection,
    Other(i64),
}

impl ObjectClass {
    /// Map a numeric class code from a MOT file.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ObjectClass::Pedestrian,
            2 => ObjectClass::PersonOnVehicle,
            3 => ObjectClass::Car,
            4 => ObjectClass::Bicycle,
            5 => ObjectClass::Motorbike,
            6 => ObjectClass::NonMotorizedVehicle,
            7 => ObjectClass::StaticPerson,
            8 => ObjectClass::Distractor,
            9 => ObjectClass::Occluder,
            10 => ObjectClass::OccluderOnGround,
            11 => ObjectClass::OccluderFull,
            12 => ObjectClass::Reflection,
            other => ObjectClass::Other(other),
        }
    }

    /// Numeric class code as written in MOT files.
    pub fn code(&self) -> i64 {
        match self {
            ObjectClass::Pedestrian => 1,
            ObjectClass::PersonOnVehicle => 2,
            ObjectClass::Car => 3,
            ObjectClass::Bicycle => 4,
            ObjectClass::Motorbike => 5,
            ObjectClass::NonMotorizedVehicle => 6,
            ObjectClass::StaticPerson => 7,
            ObjectClass::Distractor => 8,
            ObjectClass::Occluder => 9,
            ObjectClass::OccluderOnGround => 10,
            ObjectClass::OccluderFull => 11,
            ObjectClass::Reflection => 12,
            ObjectClass::Other(code) => *code,
        }
    }
}

/// A single bounding box row of a MOT annotation or prediction file.
///
/// Boxes are stored as `(x, y, width, height)` with `(x, y)` the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    pub id: ObjectId,
    pub frame: FrameIndex,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Detection confidence, or the "consider" flag for ground truth.
    pub confidence: f64,
    pub class: ObjectClass,
    /// Visible fraction in `[0, 1]`.
    pub visibility: f64,
}

impl BoxAnnotation {
    /// Create a fully visible pedestrian box with confidence 1.
    pub fn new(id: ObjectId, frame: FrameIndex, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            frame,
            x,
            y,
            width,
            height,
            confidence: 1.0,
            class: ObjectClass::Pedestrian,
            visibility: 1.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_class(mut self, class: ObjectClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Corners as `[x1, y1, x2, y2]`.
    pub fn corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// True for boxes without a positive, finite area.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        !finite || self.width <= 0.0 || self.height <= 0.0
    }
}

/// Ground truth and hypotheses of one frame.
///
/// Both sets are kept sorted by id so that matching does not depend on the
/// order in which a loader or tracker produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: FrameIndex,
    ground_truth: Vec<BoxAnnotation>,
    hypotheses: Vec<BoxAnnotation>,
}

impl Frame {
    /// Build a frame, rejecting duplicate identities and boxes from other frames.
    pub fn new(
        index: FrameIndex,
        mut ground_truth: Vec<BoxAnnotation>,
        mut hypotheses: Vec<BoxAnnotation>,
    ) -> Result<Self> {
        check_set(index, &ground_truth, "ground truth")?;
        check_set(index, &hypotheses, "hypothesis")?;

        ground_truth.sort_by_key(|b| b.id);
        hypotheses.sort_by_key(|b| b.id);

        Ok(Self {
            index,
            ground_truth,
            hypotheses,
        })
    }

    /// A frame with neither ground truth nor hypotheses.
    pub fn empty(index: FrameIndex) -> Self {
        Self {
            index,
            ground_truth: Vec::new(),
            hypotheses: Vec::new(),
        }
    }

    pub fn index(&self) -> FrameIndex {
        self.index
    }

    pub fn ground_truth(&self) -> &[BoxAnnotation] {
        &self.ground_truth
    }

    pub fn hypotheses(&self) -> &[BoxAnnotation] {
        &self.hypotheses
    }
}

fn check_set(index: FrameIndex, boxes: &[BoxAnnotation], kind: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(boxes.len());
    for b in boxes {
        if b.frame != index {
            return Err(Error::MalformedFrame(format!(
                "{} box {} belongs to frame {}, not frame {}",
                kind, b.id, b.frame, index
            )));
        }
        if !seen.insert(b.id) {
            return Err(Error::MalformedFrame(format!(
                "duplicate {} id {} in frame {}",
                kind, b.id, index
            )));
        }
    }
    Ok(())
}
