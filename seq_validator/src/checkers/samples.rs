//! Sample checker: c130.

use crate::checkers::{CheckError, CheckOutcome, Checker};
use crate::context::ValidationContext;

/// The `samples` section holds exactly one sample.
pub struct OneSample;

impl Checker for OneSample {
    fn name(&self) -> &'static str {
        "c130_one_sample"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(samples) = ctx.metadata().samples() else {
            return Ok(CheckOutcome::invalid(
                "Missing 'samples' section in the metadata JSON",
            ));
        };

        if samples.len() == 1 {
            Ok(CheckOutcome::pass("One and only one sample check status: PASS"))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'samples' section must contain exactly one sample in metadata, {} found",
                samples.len()
            )))
        }
    }
}
