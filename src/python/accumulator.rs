//! Python wrapper for MotAccumulator.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::annotation::{BoxAnnotation, Frame, FrameIndex, ObjectId};
use crate::config::{EvalConfig, LoaderConfig};
use crate::distances::distance_mode_by_name;
use crate::metrics::{MotAccumulator, MotMetrics};
use crate::Error;

/// `(id, x, y, width, height)` as passed from Python.
type PyBox = (ObjectId, f64, f64, f64, f64);

fn to_py_err(e: Error) -> PyErr {
    match e {
        Error::IoError(_) | Error::Dataset(_) => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

fn to_boxes(frame: FrameIndex, boxes: Vec<PyBox>) -> Vec<BoxAnnotation> {
    boxes
        .into_iter()
        .map(|(id, x, y, w, h)| BoxAnnotation::new(id, frame, x, y, w, h))
        .collect()
}

fn eval_config(distance: &str, max_distance: f64) -> PyResult<EvalConfig> {
    let mode = distance_mode_by_name(distance).map_err(to_py_err)?;
    let config = EvalConfig::new(mode, max_distance);
    config.validate().map_err(to_py_err)?;
    Ok(config)
}

/// CLEAR-MOT metrics of an accumulator.
///
/// Ratios are None when undefined (e.g. MOTP without any match).
#[pyclass(name = "MOTMetrics", frozen)]
#[derive(Clone)]
pub struct PyMOTMetrics {
    #[pyo3(get)]
    pub num_frames: u64,
    #[pyo3(get)]
    pub num_objects: u64,
    #[pyo3(get)]
    pub num_matches: u64,
    #[pyo3(get)]
    pub num_false_positives: u64,
    #[pyo3(get)]
    pub num_misses: u64,
    #[pyo3(get)]
    pub num_switches: u64,
    #[pyo3(get)]
    pub num_fragmentations: u64,
    #[pyo3(get)]
    pub num_unique_objects: u64,
    #[pyo3(get)]
    pub mostly_tracked: u64,
    #[pyo3(get)]
    pub partially_tracked: u64,
    #[pyo3(get)]
    pub mostly_lost: u64,
    #[pyo3(get)]
    pub mota: Option<f64>,
    #[pyo3(get)]
    pub motp: Option<f64>,
    #[pyo3(get)]
    pub precision: Option<f64>,
    #[pyo3(get)]
    pub recall: Option<f64>,
}

impl From<MotMetrics> for PyMOTMetrics {
    fn from(m: MotMetrics) -> Self {
        Self {
            num_frames: m.num_frames,
            num_objects: m.num_objects,
            num_matches: m.num_matches,
            num_false_positives: m.num_false_positives,
            num_misses: m.num_misses,
            num_switches: m.num_switches,
            num_fragmentations: m.num_fragmentations,
            num_unique_objects: m.num_unique_objects,
            mostly_tracked: m.mostly_tracked,
            partially_tracked: m.partially_tracked,
            mostly_lost: m.mostly_lost,
            mota: m.mota,
            motp: m.motp,
            precision: m.precision,
            recall: m.recall,
        }
    }
}

#[pymethods]
impl PyMOTMetrics {
    fn __repr__(&self) -> String {
        let fmt = |v: Option<f64>| v.map_or_else(|| "None".to_string(), |v| format!("{:.4}", v));
        format!(
            "MOTMetrics(num_frames={}, mota={}, motp={}, num_switches={})",
            self.num_frames,
            fmt(self.mota),
            fmt(self.motp),
            self.num_switches
        )
    }
}

/// Frame-by-frame CLEAR-MOT accumulator.
///
/// Example:
///     >>> from clearmot_rs import MOTAccumulator
///     >>> acc = MOTAccumulator(distance="iou", max_distance=0.5)
///     >>> acc.update(1, [(1, 10.0, 10.0, 20.0, 40.0)], [(7, 11.0, 10.0, 20.0, 40.0)])
///     >>> acc.compute().mota
///     1.0
#[pyclass(name = "MOTAccumulator")]
pub struct PyMOTAccumulator {
    inner: MotAccumulator,
}

#[pymethods]
impl PyMOTAccumulator {
    /// Create a new accumulator.
    ///
    /// Args:
    ///     distance: "iou" or "euclidean". Default: "iou".
    ///     max_distance: Pairs at or above this distance never match. Default: 0.5.
    #[new]
    #[pyo3(signature = (distance="iou", max_distance=0.5))]
    fn new(distance: &str, max_distance: f64) -> PyResult<Self> {
        Ok(Self {
            inner: MotAccumulator::new(eval_config(distance, max_distance)?),
        })
    }

    /// Match and accumulate one frame.
    ///
    /// Args:
    ///     frame: Frame number, strictly greater than the previous one.
    ///     ground_truth: List of (id, x, y, width, height) tuples.
    ///     hypotheses: List of (id, x, y, width, height) tuples.
    ///
    /// Returns:
    ///     List of matched (ground_truth_id, hypothesis_id, distance) tuples.
    fn update(
        &mut self,
        frame: FrameIndex,
        ground_truth: Vec<PyBox>,
        hypotheses: Vec<PyBox>,
    ) -> PyResult<Vec<(ObjectId, ObjectId, f64)>> {
        let frame_data = Frame::new(frame, to_boxes(frame, ground_truth), to_boxes(frame, hypotheses))
            .map_err(to_py_err)?;
        let frame_match = self.inner.update_frame(&frame_data).map_err(to_py_err)?;

        Ok(frame_match
            .pairs()
            .iter()
            .map(|p| (p.ground_truth_id, p.hypothesis_id, p.distance))
            .collect())
    }

    /// Metrics over all frames accumulated so far.
    fn compute(&self) -> PyMOTMetrics {
        MotMetrics::from_totals(&self.inner.totals()).into()
    }

    #[getter]
    fn last_frame(&self) -> Option<FrameIndex> {
        self.inner.last_frame()
    }
}

/// Evaluate a MOTChallenge dataset against a directory of tracker outputs.
///
/// Returns:
///     The benchmark report as a JSON string.
#[pyfunction]
#[pyo3(signature = (dataset_root, predictions_dir, distance="iou", max_distance=0.5, min_visibility=0.0))]
pub fn eval_mot_challenge(
    py: Python<'_>,
    dataset_root: &str,
    predictions_dir: &str,
    distance: &str,
    max_distance: f64,
    min_visibility: f64,
) -> PyResult<String> {
    let config = eval_config(distance, max_distance)?;
    let loader_config = LoaderConfig {
        min_visibility,
        ..LoaderConfig::default()
    };

    let report = py
        .allow_threads(|| crate::metrics::eval_mot_challenge(dataset_root, predictions_dir, &config, &loader_config))
        .map_err(to_py_err)?;

    serde_json::to_string_pretty(&report).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}
