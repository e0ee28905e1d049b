//! Reduction of per-check statuses to one overall status.

use crate::types::{CheckRecord, CheckStatus};

/// Reduce statuses to the overall status.
///
/// Precedence is `INVALID > UNKNOWN > WARNING > PASS`, evaluated over the set
/// of statuses present, so the result never depends on record order. An
/// empty input yields `UNKNOWN`: a run that checked nothing has not shown
/// the submission to be valid.
#[must_use]
pub fn aggregate<I>(statuses: I) -> CheckStatus
where
    I: IntoIterator<Item = CheckStatus>,
{
    let mut seen_any = false;
    let mut unknown = false;
    let mut warning = false;

    for status in statuses {
        seen_any = true;
        match status {
            CheckStatus::Invalid => return CheckStatus::Invalid,
            CheckStatus::Unknown => unknown = true,
            CheckStatus::Warning => warning = true,
            CheckStatus::Pass => {}
        }
    }

    if !seen_any || unknown {
        CheckStatus::Unknown
    } else if warning {
        CheckStatus::Warning
    } else {
        CheckStatus::Pass
    }
}

/// Overall status of a sequence of records.
#[must_use]
pub fn aggregate_records(records: &[CheckRecord]) -> CheckStatus {
    aggregate(records.iter().map(|r| r.status))
}
