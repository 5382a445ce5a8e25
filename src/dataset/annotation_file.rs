//! Annotation file parser for MOTChallenge format.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;

use crate::annotation::{BoxAnnotation, FrameIndex, ObjectClass, ObjectId};
use crate::config::LoaderConfig;
use crate::{Error, Result};

/// Which side of the evaluation a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// `gt.txt`: columns 7-9 are the consider flag, class and visibility.
    GroundTruth,
    /// Tracker output or `det.txt`: columns 7-10 are confidence and world coordinates.
    Hypothesis,
}

/// Boxes of one annotation file, grouped by frame in ascending order.
///
/// Reads files in CSV format:
/// `frame,id,bb_left,bb_top,bb_width,bb_height,conf[,class,visibility,...]`
#[derive(Debug, Clone, Default)]
pub struct AnnotationFile {
    frames: BTreeMap<FrameIndex, Vec<BoxAnnotation>>,
    skipped_lines: usize,
}

impl AnnotationFile {
    /// Read an annotation file.
    ///
    /// Malformed lines are logged and skipped. When a loader configuration is
    /// given, ground-truth rows it rejects are dropped.
    pub fn read<P: AsRef<Path>>(
        file_path: P,
        kind: AnnotationKind,
        config: Option<&LoaderConfig>,
    ) -> Result<Self> {
        let path = file_path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open annotation file '{}': {}", path.display(), e),
            ))
        })?;

        Self::from_reader(BufReader::new(file), &path.display().to_string(), kind, config)
    }

    /// Parse annotations from any buffered reader; `source` names it in log messages.
    pub fn from_reader<R: BufRead>(
        reader: R,
        source: &str,
        kind: AnnotationKind,
        config: Option<&LoaderConfig>,
    ) -> Result<Self> {
        let mut parsed = Self::default();

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            let annotation = match parse_line(&line, kind) {
                Ok(annotation) => annotation,
                Err(message) => {
                    warn!("{}:{}: skipping malformed line: {}", source, idx + 1, message);
                    parsed.skipped_lines += 1;
                    continue;
                }
            };

            let keep = match (kind, config) {
                (AnnotationKind::GroundTruth, Some(config)) => config.keeps(&annotation),
                _ => true,
            };
            if keep {
                parsed.push(annotation);
            }
        }

        Ok(parsed)
    }

    /// Group already-built annotations by their frame index.
    pub fn from_annotations<I: IntoIterator<Item = BoxAnnotation>>(annotations: I) -> Self {
        let mut file = Self::default();
        for annotation in annotations {
            file.push(annotation);
        }
        file
    }

    /// Renumber the boxes of every frame `1..=n` in file order.
    ///
    /// Detections carry no identity (id `-1`), so this makes them usable as a
    /// set of distinct objects per frame.
    pub fn with_positional_ids(mut self) -> Self {
        for boxes in self.frames.values_mut() {
            for (position, annotation) in boxes.iter_mut().enumerate() {
                annotation.id = position as ObjectId + 1;
            }
        }
        self
    }

    fn push(&mut self, annotation: BoxAnnotation) {
        self.frames.entry(annotation.frame).or_default().push(annotation);
    }

    /// Boxes of a frame, in file order. Frames without rows are empty.
    pub fn frame(&self, index: FrameIndex) -> &[BoxAnnotation] {
        self.frames.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of the frames that have at least one box, ascending.
    pub fn frame_indices(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.frames.keys().copied()
    }

    pub fn last_frame(&self) -> Option<FrameIndex> {
        self.frames.keys().next_back().copied()
    }

    pub fn num_boxes(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    /// Number of lines that could not be parsed.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn parse_field<T: std::str::FromStr>(parts: &[&str], idx: usize, name: &str) -> std::result::Result<T, String> {
    let raw = parts.get(idx).ok_or_else(|| format!("missing {}", name))?;
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", name, raw.trim()))
}

fn parse_line(line: &str, kind: AnnotationKind) -> std::result::Result<BoxAnnotation, String> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 6 {
        return Err(format!("expected at least 6 columns, got {}", parts.len()));
    }

    // MOT frames are 1-indexed
    let frame: FrameIndex = parse_field(&parts, 0, "frame")?;
    if frame < 1 {
        return Err(format!("frame {} is not positive", frame));
    }

    // Ids are written as floats by some trackers ("3.0")
    let id: f64 = parse_field(&parts, 1, "id")?;
    if !id.is_finite() || id.fract() != 0.0 {
        return Err(format!("invalid id '{}'", parts[1].trim()));
    }

    let bb_left: f64 = parse_field(&parts, 2, "bb_left")?;
    let bb_top: f64 = parse_field(&parts, 3, "bb_top")?;
    let bb_width: f64 = parse_field(&parts, 4, "bb_width")?;
    let bb_height: f64 = parse_field(&parts, 5, "bb_height")?;

    let confidence: f64 = if parts.len() > 6 {
        parse_field(&parts, 6, "conf")?
    } else {
        1.0
    };

    let mut annotation = BoxAnnotation::new(id as i64, frame, bb_left, bb_top, bb_width, bb_height)
        .with_confidence(confidence);

    if kind == AnnotationKind::GroundTruth {
        if parts.len() > 7 {
            let code: f64 = parse_field(&parts, 7, "class")?;
            annotation = annotation.with_class(ObjectClass::from_code(code as i64));
        }
        if parts.len() > 8 {
            let visibility: f64 = parse_field(&parts, 8, "visibility")?;
            annotation = annotation.with_visibility(visibility);
        }
    }

    Ok(annotation)
}
