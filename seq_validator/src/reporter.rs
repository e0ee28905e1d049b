//! Report serialization.
//!
//! Produces:
//!
//! 1. **JSON**: pretty-printed [`ValidationReport`], the `report.json` format.
//! 2. **JSONL**: the same report on a single line, for appending to logs.
//! 3. **Summary**: a [`SummaryReport`] counting overall statuses when several
//!    submissions are validated in one invocation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::utc_now_iso;
use crate::types::{CheckStatus, SubmissionStatus, SummaryReport, ValidationReport, TOOL_VERSION};

/// File name of the per-submission report written next to its metadata.
pub const REPORT_FILE_NAME: &str = "report.json";

/// `message` of every summary report.
pub const SUMMARY_MESSAGE: &str =
    "Please check 'report.json' next to each metadata file for more details.";

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

/// Serialize a report to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error message if serialization fails (should not happen for valid data).
pub fn to_json<T: Serialize>(report: &T) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Serialize a report to a single JSON line, without a trailing newline.
///
/// # Errors
///
/// Returns an error message if serialization fails.
pub fn to_jsonl<T: Serialize>(report: &T) -> Result<String, String> {
    serde_json::to_string(report).map_err(|e| format!("JSONL serialization failed: {e}"))
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Summarize the reports of one multi-submission run, in validation order.
///
/// Reports without a `metadata_file` are listed under an empty name.
#[must_use]
pub fn build_summary(reports: &[ValidationReport], started_at: String) -> SummaryReport {
    let mut summary: BTreeMap<CheckStatus, u32> = BTreeMap::new();
    let mut status = Vec::with_capacity(reports.len());

    for report in reports {
        *summary.entry(report.status()).or_insert(0) += 1;
        status.push(SubmissionStatus {
            metadata_file: report.metadata_file.clone().unwrap_or_default(),
            status: report.status(),
        });
    }

    SummaryReport {
        summary,
        version: TOOL_VERSION.to_owned(),
        status,
        started_at,
        ended_at: utc_now_iso(),
        message: SUMMARY_MESSAGE.to_owned(),
    }
}

/// Progress line printed to stderr after each submission.
#[must_use]
pub fn progress_line(metadata_file: &str, status: CheckStatus, current: usize, total: usize) -> String {
    format!(
        "metadata_file: {metadata_file}, status: {status}, current_time: {}, progress: {current}/{total}",
        utc_now_iso()
    )
}
