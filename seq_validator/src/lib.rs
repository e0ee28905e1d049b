//! seq-validator: validation of ICGC ARGO sequencing data submissions.
//!
//! A submission is a metadata JSON document (samples, read groups, files)
//! plus, optionally, a directory holding the BAM/FASTQ files it describes.
//! The [`engine::ValidationEngine`] runs an ordered set of checkers over it,
//! gating each on the outcome of its prerequisites and containing any fault,
//! and reduces the verdicts to one overall status.
//!
//! ```no_run
//! use seq_validator::engine::{ValidationEngine, ValidationInput};
//!
//! let report = ValidationEngine::default().validate(ValidationInput::file("sub1/metadata.json"));
//! println!("{}", report.status());
//! ```
//!
//! With the `python` feature the crate also builds the `seq_validator`
//! Python module.

// PyO3-generated code trips this lint on PyResult return types.
#![cfg_attr(feature = "python", allow(clippy::useless_conversion))]

pub mod aggregate;
pub mod bam;
pub mod barrier;
pub mod checkers;
pub mod config;
pub mod context;
pub mod discovery;
pub mod engine;
pub mod gate;
#[cfg(feature = "python")]
pub mod pyo3_bindings;
pub mod registry;
pub mod reporter;
pub mod tools;
pub mod types;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The Python module exposed by this crate.
///
/// Importable as: `from seq_validator import validate`
#[cfg(feature = "python")]
#[pymodule]
fn seq_validator(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Rust `log` records go to Python logging
    pyo3_log::init();

    pyo3_bindings::register_module(m)?;

    Ok(())
}
