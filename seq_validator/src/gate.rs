//! Dependency gating.
//!
//! A checker's declared prerequisites are looked up among the records
//! already appended to the context. Only earlier checkers are visible, so a
//! forward reference behaves exactly like a reference to an unknown checker.

use std::collections::HashMap;

use crate::checkers::CheckOutcome;
use crate::types::{CheckRecord, CheckStatus};

/// Prefix of the message recorded for a blocked checker.
pub const UNMET_DEPENDENCY_PREFIX: &str =
    "Unable to perform this check as dependent check(s) did not pass";

/// Outcome of evaluating a checker's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Every resolvable prerequisite passed; run the checker.
    Proceed,
    /// At least one prerequisite did not pass; record this outcome instead.
    Blocked(CheckOutcome),
}

/// Evaluate `depends_on` for `checker` against the records so far.
///
/// Self-references and names with no record are logged and ignored. Unmet
/// dependencies are listed in declared order as `name: STATUS`.
#[must_use]
pub fn evaluate(checker: &str, depends_on: &[&str], records: &[CheckRecord]) -> GateDecision {
    if depends_on.is_empty() {
        return GateDecision::Proceed;
    }

    let recorded: HashMap<&str, CheckStatus> = records
        .iter()
        .map(|r| (r.checker.as_str(), r.status))
        .collect();

    let mut unmet = Vec::new();
    for dep in depends_on {
        if *dep == checker {
            log::info!("[{checker}] ignoring dependency on itself");
            continue;
        }
        match recorded.get(dep) {
            None => {
                log::info!("[{checker}] ignoring dependency '{dep}': no such check has run");
            }
            Some(CheckStatus::Pass) => {}
            Some(status) => unmet.push(format!("{dep}: {status}")),
        }
    }

    if unmet.is_empty() {
        GateDecision::Proceed
    } else {
        GateDecision::Blocked(CheckOutcome::with_status(
            CheckStatus::Unknown,
            format!("{UNMET_DEPENDENCY_PREFIX}: {}", unmet.join(", ")),
        ))
    }
}
