//! Fault containment around checker execution.
//!
//! Every checker body runs inside [`run_guarded`]. Errors returned by the
//! checker and panics raised inside it both become an `UNKNOWN` outcome
//! with a generic message; the fault detail goes to the log only.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::checkers::{CheckOutcome, Checker};
use crate::context::ValidationContext;
use crate::types::CheckStatus;

/// Lead sentence of every fault message.
pub const FAULT_MESSAGE_PREFIX: &str = "An error occurred while running this check.";

/// Generic message for a faulted checker.
///
/// Metadata-only runs point at `--debug`; runs with a data directory point
/// at the log file when one is known.
#[must_use]
pub fn fault_message(ctx: &ValidationContext) -> String {
    match (ctx.data_dir(), ctx.log_file()) {
        (None, _) => format!(
            "{FAULT_MESSAGE_PREFIX} Please rerun the validation with '--debug' to see the \
             error details."
        ),
        (Some(_), Some(log_file)) => format!(
            "{FAULT_MESSAGE_PREFIX} Please check the log file for details: {}",
            log_file.display()
        ),
        (Some(_), None) => {
            format!("{FAULT_MESSAGE_PREFIX} Please see the log output for details.")
        }
    }
}

/// Run a checker, converting any fault into an `UNKNOWN` outcome.
pub fn run_guarded(checker: &dyn Checker, ctx: &ValidationContext) -> CheckOutcome {
    let result = catch_unwind(AssertUnwindSafe(|| checker.check(ctx)));

    let detail = match result {
        Ok(Ok(outcome)) => return outcome,
        Ok(Err(err)) => err.to_string(),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                (*s).to_owned()
            } else {
                "unknown panic".to_owned()
            };
            format!("panic: {panic_msg}")
        }
    };

    log::error!("[{}] check failed: {detail}", checker.name());
    CheckOutcome::with_status(CheckStatus::Unknown, fault_message(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::CheckError;
    use crate::context::Metadata;
    use std::path::PathBuf;

    struct Returns(CheckStatus);
    struct Fails;
    struct Panics;

    impl Checker for Returns {
        fn name(&self) -> &'static str {
            "c001_returns"
        }
        fn check(&self, _ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
            Ok(CheckOutcome::with_status(self.0, "done"))
        }
    }

    impl Checker for Fails {
        fn name(&self) -> &'static str {
            "c002_fails"
        }
        fn check(&self, _ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
            Err(CheckError::MissingField("files.secret_detail".to_owned()))
        }
    }

    impl Checker for Panics {
        fn name(&self) -> &'static str {
            "c003_panics"
        }
        fn check(&self, _ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
            panic!("index out of bounds");
        }
    }

    #[test]
    fn test_outcome_passes_through() {
        let ctx = ValidationContext::new(Metadata::default());
        for status in [CheckStatus::Pass, CheckStatus::Invalid, CheckStatus::Warning] {
            let out = run_guarded(&Returns(status), &ctx);
            assert_eq!(out.status, status);
            assert_eq!(out.message, "done");
        }
    }

    #[test]
    fn test_error_becomes_unknown_without_detail() {
        let ctx = ValidationContext::new(Metadata::default());
        let out = run_guarded(&Fails, &ctx);
        assert_eq!(out.status, CheckStatus::Unknown);
        assert!(out.message.contains("--debug"));
        assert!(!out.message.contains("secret_detail"));
    }

    #[test]
    fn test_panic_becomes_unknown() {
        let ctx = ValidationContext::new(Metadata::default());
        let out = run_guarded(&Panics, &ctx);
        assert_eq!(out.status, CheckStatus::Unknown);
        assert!(!out.message.contains("index out of bounds"));
    }

    #[test]
    fn test_message_points_at_log_file() {
        let ctx = ValidationContext::new(Metadata::default())
            .with_data_dir(PathBuf::from("/data"), Vec::new())
            .with_log_file(Some(PathBuf::from("/data/logs/run.log")));
        let out = run_guarded(&Fails, &ctx);
        assert!(out.message.ends_with("/data/logs/run.log"));

        let ctx = ValidationContext::new(Metadata::default())
            .with_data_dir(PathBuf::from("/data"), Vec::new());
        assert!(fault_message(&ctx).contains("log output"));
    }
}
