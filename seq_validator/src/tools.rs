//! External tool seam.
//!
//! File checkers never spawn processes directly; they go through
//! [`SeqTools`], whose default implementation shells out to `samtools`.
//! Tests substitute an in-memory implementation.

use std::path::Path;
use std::process::Command;

use crate::checkers::CheckError;

/// Operations on sequencing files that need an external program.
pub trait SeqTools: Send + Sync {
    /// SAM header text of a BAM file (`samtools view -H`).
    fn view_header(&self, bam: &Path) -> Result<String, CheckError>;

    /// Run `samtools quickcheck` on a BAM file.
    ///
    /// Returns `Ok(None)` when the file passes, `Ok(Some(detail))` when the
    /// tool reports the file as corrupted, and `Err` when the tool cannot run.
    fn quickcheck(&self, bam: &Path) -> Result<Option<String>, CheckError>;
}

/// [`SeqTools`] backed by a `samtools` executable.
#[derive(Debug, Clone)]
pub struct Samtools {
    program: String,
}

impl Samtools {
    /// Use the given `samtools` executable (name on `PATH` or full path).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> CheckError {
        CheckError::Tool {
            tool: self.program.clone(),
            message: format!("failed to execute: {err}"),
        }
    }
}

impl Default for Samtools {
    fn default() -> Self {
        Self::new("samtools")
    }
}

impl SeqTools for Samtools {
    fn view_header(&self, bam: &Path) -> Result<String, CheckError> {
        let output = Command::new(&self.program)
            .args(["view", "-H"])
            .arg(bam)
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(CheckError::Tool {
                tool: self.program.clone(),
                message: format!(
                    "'view -H {}' exited with {}: {}",
                    bam.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn quickcheck(&self, bam: &Path) -> Result<Option<String>, CheckError> {
        let output = Command::new(&self.program)
            .arg("quickcheck")
            .arg(bam)
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            Ok(None)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(Some(stderr.trim().replace('\n', " ")))
        }
    }
}
