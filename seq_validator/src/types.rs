//! Core type definitions for the sequencing submission validator.
//!
//! These types form the contract between the engine, the checkers and the
//! report writers:
//!
//! - [`CheckStatus`] is the closed status vocabulary (`PASS`, `WARNING`,
//!   `INVALID`, `UNKNOWN`)
//! - [`CheckRecord`] is the atomic unit of check output, one per executed checker
//! - [`CheckerDescriptor`] is the static description of a registered checker
//! - [`ValidationResult`] is the aggregate outcome of one run
//! - [`ValidationReport`] and [`SummaryReport`] are the serialized report shapes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tool name written into every report.
pub const TOOL_NAME: &str = "seq-validator";

/// Tool version written into every report.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of a single check, and of a validation run as a whole.
///
/// Serialized as the exact upper-case literals used throughout the reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    /// The submission satisfies the rule.
    Pass,
    /// The submission conforms but something is suboptimal.
    Warning,
    /// The submission violates a hard constraint.
    Invalid,
    /// The rule could not be meaningfully evaluated.
    Unknown,
}

impl CheckStatus {
    /// The literal used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warning => "WARNING",
            Self::Invalid => "INVALID",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record a checker leaves behind in the validation context.
///
/// Built once, after the checker (or the gate or barrier acting for it) has
/// decided its status, and never mutated after being appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Registered checker name, e.g. `c110_rg_id_uniqueness`.
    pub checker: String,

    /// Final status of the check.
    pub status: CheckStatus,

    /// Human-readable explanation of the status.
    pub message: String,
}

impl CheckRecord {
    /// Create a record for the named checker.
    #[must_use]
    pub fn new(checker: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            checker: checker.into(),
            status,
            message: message.into(),
        }
    }
}

/// Static description of a registered checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerDescriptor {
    /// Registry key, also the string other checkers cite as a dependency.
    pub name: String,

    /// Whether the checker inspects the actual sequencing files.
    pub requires_data_dir: bool,

    /// Checkers that must have recorded `PASS` before this one runs.
    pub depends_on: Vec<String>,
}

/// Aggregate result of running the ordered checkers over one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Overall status reduced from every record.
    pub status: CheckStatus,

    /// Every record, in execution order.
    pub checks: Vec<CheckRecord>,
}

/// Tool identification block of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Tool version.
    pub version: String,
}

impl Default for ToolInfo {
    fn default() -> Self {
        Self {
            name: TOOL_NAME.to_owned(),
            version: TOOL_VERSION.to_owned(),
        }
    }
}

/// The `validation` block of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSection {
    /// Overall status.
    pub status: CheckStatus,

    /// Overall message; explains structural failures, otherwise points at the checks.
    pub message: String,

    /// Individual check records in execution order.
    pub checks: Vec<CheckRecord>,
}

/// Full report for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Tool that produced the report.
    pub tool: ToolInfo,

    /// Absolute path of the metadata file, or `<supplied as a JSON string>`.
    pub metadata_file: Option<String>,

    /// Absolute path of the data directory, if any.
    pub data_dir: Option<String>,

    /// Sequencing files discovered in the data directory. Absent for
    /// metadata supplied as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_files: Option<Vec<String>>,

    /// UTC start time.
    pub started_at: String,

    /// UTC end time.
    pub ended_at: String,

    /// Validation outcome.
    pub validation: ValidationSection,
}

impl ValidationReport {
    /// Overall status of the submission.
    #[must_use]
    pub fn status(&self) -> CheckStatus {
        self.validation.status
    }

    /// Look up the record of a checker by name.
    #[must_use]
    pub fn check(&self, checker: &str) -> Option<&CheckRecord> {
        self.validation.checks.iter().find(|c| c.checker == checker)
    }
}

/// One line of the multi-submission summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStatus {
    /// Metadata file validated.
    pub metadata_file: String,
    /// Its overall status.
    pub status: CheckStatus,
}

/// Summary over several submissions validated in one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Number of submissions per overall status.
    pub summary: BTreeMap<CheckStatus, u32>,

    /// Tool version.
    pub version: String,

    /// Per-submission statuses in the order validated.
    pub status: Vec<SubmissionStatus>,

    /// UTC start time.
    pub started_at: String,

    /// UTC end time.
    pub ended_at: String,

    /// Pointer to the per-submission reports.
    pub message: String,
}
