//! Python bindings for clearmot-rs using PyO3.
//!
//! Exposes a `MOTAccumulator` modelled on `motmetrics.MOTAccumulator`, its
//! `MOTMetrics` result and the dataset-level `eval_mot_challenge`.

use pyo3::prelude::*;

mod accumulator;

pub use accumulator::{PyMOTAccumulator, PyMOTMetrics};

/// Python module for clearmot-rs.
///
/// The function is named `_clearmot_rs` with underscore prefix for mixed Python/Rust projects.
#[pymodule]
fn _clearmot_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMOTAccumulator>()?;
    m.add_class::<PyMOTMetrics>()?;

    m.add_function(wrap_pyfunction!(accumulator::eval_mot_challenge, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
