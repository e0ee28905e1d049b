//! PyO3 bindings exposing the validator to Python.
//!
//! The Python module is importable as:
//! ```python
//! from seq_validator import validate, list_checkers
//! report = json.loads(validate(metadata_json, data_dir="/path/to/submission"))
//! ```

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use crate::engine::{ValidationEngine, ValidationInput};
use crate::reporter;

/// Validate a submission given its metadata as a JSON string.
///
/// # Arguments
///
/// * `metadata_json`: Submission metadata document.
/// * `data_dir`: Directory holding the sequencing files; file checks are
///   skipped without it.
///
/// # Returns
///
/// The validation report as pretty-printed JSON.
///
/// # Errors
///
/// Returns a `PyErr` if the report cannot be serialized.
#[pyfunction]
#[pyo3(signature = (metadata_json, data_dir=None))]
pub fn validate(py: Python<'_>, metadata_json: &str, data_dir: Option<&str>) -> PyResult<String> {
    let mut input = ValidationInput::json(metadata_json);
    if let Some(dir) = data_dir {
        input = input.with_data_dir(dir);
    }
    let report = py.allow_threads(|| ValidationEngine::default().validate(input));
    reporter::to_json(&report).map_err(PyRuntimeError::new_err)
}

/// Names of the built-in checkers in run order.
#[pyfunction]
pub fn list_checkers() -> Vec<String> {
    ValidationEngine::default()
        .registry()
        .iter()
        .map(|c| c.name().to_owned())
        .collect()
}

/// Register all functions into the Python module.
pub fn register_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    m.add_function(wrap_pyfunction!(list_checkers, m)?)?;
    m.add("__version__", crate::types::TOOL_VERSION)?;
    Ok(())
}
