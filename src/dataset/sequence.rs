//! One MOTChallenge sequence directory.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{AnnotationFile, AnnotationKind, SequenceInfo};
use crate::annotation::{BoxAnnotation, FrameIndex};
use crate::config::LoaderConfig;
use crate::{Error, Result};

/// Loaded sequence: its metadata and its filtered ground truth.
///
/// Layout:
/// ```text
/// MOT16-02/
///   seqinfo.ini
///   img1/000001.jpg ...
///   gt/gt.txt        (train split)
///   det/det.txt      (test split, used when gt/ is absent)
/// ```
#[derive(Debug, Clone)]
pub struct SequenceLoader {
    dir: PathBuf,
    info: SequenceInfo,
    ground_truth: AnnotationFile,
    from_detections: bool,
}

impl SequenceLoader {
    /// Read `seqinfo.ini` and the annotations of a sequence directory.
    pub fn open<P: AsRef<Path>>(dir: P, config: &LoaderConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let info = SequenceInfo::read(dir.join("seqinfo.ini"))?;

        let gt_path = dir.join("gt").join("gt.txt");
        let det_path = dir.join("det").join("det.txt");

        let (ground_truth, from_detections) = if gt_path.is_file() {
            (AnnotationFile::read(&gt_path, AnnotationKind::GroundTruth, Some(config))?, false)
        } else if det_path.is_file() {
            debug!("{}: no ground truth, using {}", info.name, det_path.display());
            let detections = AnnotationFile::read(&det_path, AnnotationKind::Hypothesis, None)?;
            (detections.with_positional_ids(), true)
        } else {
            return Err(Error::Dataset(format!(
                "no gt/gt.txt or det/det.txt in {}",
                dir.display()
            )));
        };

        if let Some(last) = ground_truth.last_frame() {
            if last > info.seq_length {
                warn!(
                    "{}: annotations reach frame {} beyond seqLength {}",
                    info.name, last, info.seq_length
                );
            }
        }

        debug!(
            "opened sequence {} ({} frames, {} boxes)",
            info.name,
            info.seq_length,
            ground_truth.num_boxes()
        );

        Ok(Self {
            dir,
            info,
            ground_truth,
            from_detections,
        })
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn info(&self) -> &SequenceInfo {
        &self.info
    }

    pub fn num_frames(&self) -> i64 {
        self.info.seq_length
    }

    pub fn ground_truth(&self) -> &AnnotationFile {
        &self.ground_truth
    }

    /// Whether the annotations come from `det/det.txt` rather than ground truth.
    pub fn from_detections(&self) -> bool {
        self.from_detections
    }

    /// Frames `1..=seqLength` with their ground-truth boxes.
    ///
    /// Every call returns a fresh iterator; frames without boxes are included.
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, &[BoxAnnotation])> + '_ {
        (1..=self.info.seq_length).map(move |frame| (frame, self.ground_truth.frame(frame)))
    }

    /// Path of the image of a frame, e.g. `img1/000001.jpg`.
    pub fn image_path(&self, frame: FrameIndex) -> PathBuf {
        self.dir
            .join(&self.info.im_dir)
            .join(format!("{:06}{}", frame, self.info.im_ext))
    }
}
