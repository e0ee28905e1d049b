//! Checker trait definition and checker registration list.
//!
//! Every checker implements the [`Checker`] trait: it reads the shared
//! [`ValidationContext`] and returns one [`CheckOutcome`]. Checkers are
//! stateless; dependency gating and fault containment are applied around
//! them by the engine, never inside them.
//!
//! Checker names carry a sortable code prefix (`c110_...`) that fixes the run
//! order. Codes in the 600-999 range mark checkers that read the sequencing
//! files themselves and are only run when a data directory is supplied.

pub mod bam_header;
pub mod data_files;
pub mod files;
pub mod read_groups;
pub mod samples;

use std::path::PathBuf;

use crate::context::ValidationContext;
use crate::types::{CheckStatus, CheckerDescriptor};

/// Every checker implements this trait.
///
/// Checkers must be `Send + Sync` so the registry can be shared, although
/// the engine runs them strictly one at a time.
pub trait Checker: Send + Sync {
    /// Unique registered name, e.g. `c110_rg_id_uniqueness`.
    fn name(&self) -> &'static str;

    /// Checkers that must have recorded `PASS` before this one runs.
    fn depends_on(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the checker inspects files in the data directory.
    ///
    /// Defaults to the code range convention of [`requires_data_dir_by_code`].
    fn requires_data_dir(&self) -> bool {
        requires_data_dir_by_code(self.name())
    }

    /// Evaluate the rule.
    ///
    /// Business outcomes (`INVALID`, `WARNING`) are returned as `Ok`. An
    /// `Err` means the rule could not be evaluated at all and is reported
    /// as `UNKNOWN`.
    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError>;

    /// Static description of this checker.
    fn descriptor(&self) -> CheckerDescriptor {
        CheckerDescriptor {
            name: self.name().to_owned(),
            requires_data_dir: self.requires_data_dir(),
            depends_on: self.depends_on().iter().map(|d| (*d).to_owned()).collect(),
        }
    }
}

/// Whether a checker name's code prefix falls in the file-inspecting range.
///
/// `c605_all_files_accessible` → `true`, `c110_rg_id_uniqueness` → `false`.
/// Names without a `c<digits>` prefix are treated as metadata-only.
#[must_use]
pub fn requires_data_dir_by_code(name: &str) -> bool {
    let code = name.split('_').next().unwrap_or("");
    match code.strip_prefix('c') {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            matches!(digits.as_bytes()[0], b'6'..=b'9')
        }
        _ => false,
    }
}

/// Status and message decided by a checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Final status.
    pub status: CheckStatus,
    /// Explanation written to the report.
    pub message: String,
}

impl CheckOutcome {
    /// The rule is satisfied.
    #[must_use]
    pub fn pass(message: impl Into<String>) -> Self {
        Self::with_status(CheckStatus::Pass, message)
    }

    /// The rule is satisfied with reservations.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_status(CheckStatus::Warning, message)
    }

    /// The rule is violated.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::with_status(CheckStatus::Invalid, message)
    }

    /// Any status.
    #[must_use]
    pub fn with_status(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Faults raised by checker bodies.
///
/// None of these is ever shown to the submitter verbatim; the engine logs
/// them and records a generic `UNKNOWN`.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// A metadata section the checker relies on is missing or empty.
    #[error("missing '{0}' section in metadata")]
    MissingSection(String),

    /// A field the checker relies on is missing.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A field has the wrong JSON type.
    #[error("field '{field}' should be {expected}, found {found}")]
    UnexpectedType {
        /// Dotted field path.
        field: String,
        /// Expected JSON type.
        expected: &'static str,
        /// Actual JSON type.
        found: &'static str,
    },

    /// A file checker ran without a data directory.
    #[error("no data directory available")]
    NoDataDirectory,

    /// Filesystem access failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An external tool failed to run or returned an error.
    #[error("{tool}: {message}")]
    Tool {
        /// Program name.
        tool: String,
        /// What went wrong.
        message: String,
    },

    /// Input is in a state an earlier check should have reported.
    #[error("{0}")]
    Inconsistent(String),
}

/// Build the list of all available checkers.
///
/// Order here is irrelevant; [`crate::registry::CheckerRegistry`] sorts by name.
#[must_use]
pub fn build_checker_registry() -> Vec<Box<dyn Checker>> {
    vec![
        Box::new(read_groups::RgIdUniqueness),
        Box::new(read_groups::PermissibleCharInRgId),
        Box::new(samples::OneSample),
        Box::new(read_groups::PlatformUnitUniqueness),
        Box::new(read_groups::RgCountMatch),
        Box::new(files::FileR1R2Check),
        Box::new(files::FqUniquenessInRgs),
        Box::new(files::FileUniqueness),
        Box::new(files::NoExtraFiles),
        Box::new(read_groups::RgIdInBamUniqueness),
        Box::new(files::NoPathInFilename),
        Box::new(read_groups::NoRgIdInBamForFq),
        Box::new(files::FilesInfoDataCategory),
        Box::new(read_groups::SubmitterRgIdCollideWithRgIdInBam),
        Box::new(files::FileDataType),
        Box::new(files::FilenamePattern),
        Box::new(data_files::AllFilesAccessible),
        Box::new(bam_header::BamSanity),
        Box::new(bam_header::RgIdInBam),
        Box::new(bam_header::SubmitterReadGroupIdMatch),
        Box::new(bam_header::RgIdInBamMatch),
        Box::new(bam_header::OneSmInBamHeader),
        Box::new(bam_header::SmInBamMatchesMetadata),
        Box::new(bam_header::MetadataInBamRgHeader),
        Box::new(data_files::FileSizeMatch),
        Box::new(data_files::NestedCramMd5AndSizeMatch),
    ]
}

/// Collect unique values preserving first-seen order.
pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_owned());
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers shared by checker unit tests.

    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use serde_json::Value;

    use super::{CheckError, CheckOutcome, Checker};
    use crate::context::{Metadata, ValidationContext};
    use crate::tools::SeqTools;

    /// In-memory [`SeqTools`] keyed by file name.
    #[derive(Default)]
    pub struct FakeTools {
        pub headers: HashMap<String, String>,
        pub corrupted: HashMap<String, String>,
    }

    impl FakeTools {
        pub fn with_header(mut self, bam: &str, header: &str) -> Self {
            self.headers.insert(bam.to_owned(), header.to_owned());
            self
        }

        pub fn with_corrupted(mut self, bam: &str, detail: &str) -> Self {
            self.corrupted.insert(bam.to_owned(), detail.to_owned());
            self
        }

        fn key(path: &Path) -> String {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    }

    impl SeqTools for FakeTools {
        fn view_header(&self, bam: &Path) -> Result<String, CheckError> {
            self.headers
                .get(&Self::key(bam))
                .cloned()
                .ok_or_else(|| CheckError::Tool {
                    tool: "fake-samtools".to_owned(),
                    message: format!("no header for {}", bam.display()),
                })
        }

        fn quickcheck(&self, bam: &Path) -> Result<Option<String>, CheckError> {
            Ok(self.corrupted.get(&Self::key(bam)).cloned())
        }
    }

    /// Metadata-only context.
    pub fn ctx(metadata: Value) -> ValidationContext {
        ValidationContext::new(Metadata::from_value(metadata).expect("metadata must be an object"))
    }

    /// Context with a data directory and fake tools.
    pub fn ctx_with_data(metadata: Value, dir: &Path, tools: FakeTools) -> ValidationContext {
        let files = crate::discovery::discover_data_files(dir);
        ctx(metadata)
            .with_data_dir(PathBuf::from(dir), files)
            .with_tools(Arc::new(tools))
    }

    /// Run a checker and unwrap its outcome.
    pub fn run(checker: &dyn Checker, ctx: &ValidationContext) -> CheckOutcome {
        checker
            .check(ctx)
            .unwrap_or_else(|e| panic!("{} faulted: {e}", checker.name()))
    }
}
