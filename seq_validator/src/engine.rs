//! Validation engine, the main entry point for validating a submission.
//!
//! [`ValidationEngine::validate`] loads the metadata, discovers the data
//! files, runs the ordered checkers and assembles a [`ValidationReport`].
//! [`ValidationEngine::run`] is the orchestration loop on its own:
//!
//! 1. ask the [`CheckerRegistry`] for the checkers that apply to this run
//! 2. for each, evaluate its prerequisites with the dependency gate
//! 3. run it under the exception barrier unless the gate blocked it
//! 4. append its record before moving to the next checker
//! 5. aggregate every recorded status into the overall status
//!
//! The loop is strictly sequential: a checker's gate reads the records of
//! every checker before it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::aggregate::aggregate_records;
use crate::barrier::run_guarded;
use crate::checkers::Checker;
use crate::config::{CheckerFilter, ConfigError, ValidationConfig};
use crate::context::{Metadata, ValidationContext};
use crate::discovery::discover_data_files;
use crate::gate::{self, GateDecision};
use crate::registry::CheckerRegistry;
use crate::tools::{Samtools, SeqTools};
use crate::types::{
    CheckRecord, CheckStatus, ToolInfo, ValidationReport, ValidationResult, ValidationSection,
};

/// `metadata_file` value in reports for metadata passed as a string.
pub const STRING_METADATA_LABEL: &str = "<supplied as a JSON string>";

/// `validation.message` of a report whose checks ran.
pub const DEFAULT_REPORT_MESSAGE: &str = "Please see individual checks for details";

/// Current UTC time as ISO-8601 with milliseconds, e.g. `2024-05-01T12:00:00.123Z`.
#[must_use]
pub fn utc_now_iso() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

// ---------------------------------------------------------------------------
// Metadata ingestion
// ---------------------------------------------------------------------------

/// Where the submission metadata comes from.
#[derive(Debug, Clone)]
pub enum MetadataSource {
    /// A JSON file on disk.
    File(PathBuf),
    /// A JSON document as a string.
    Json(String),
    /// An already-parsed JSON value.
    Value(Value),
}

/// Structural input failures. Any of these ends the run before a checker runs.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The file could not be read or is not JSON.
    #[error(
        "Failed to open '{path}'. Unable to continue with further checks. Please make sure it \
         is a valid JSON file and readable. Error message: {detail}"
    )]
    Unreadable {
        /// Metadata file path.
        path: String,
        /// I/O or parse error.
        detail: String,
    },

    /// The string is not JSON.
    #[error("Unable to load metadata, please ensure it's a valid JSON string. Error: {0}")]
    InvalidJson(String),

    /// The file holds JSON that is not an object.
    #[error("Metadata file '{0}' is not a JSON object. Unable to continue with further checks.")]
    FileNotObject(String),

    /// The supplied JSON is not an object.
    #[error("Provided metadata is not a JSON object. Unable to continue with further checks.")]
    NotObject,
}

impl MetadataSource {
    /// Parse the metadata into a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a [`MetadataError`] if the input is unreadable, not JSON, or
    /// not a JSON object.
    pub fn load(self) -> Result<Metadata, MetadataError> {
        match self {
            Self::File(path) => {
                let display = path.display().to_string();
                let unreadable = |detail: String| MetadataError::Unreadable {
                    path: display.clone(),
                    detail,
                };
                let content =
                    std::fs::read_to_string(&path).map_err(|e| unreadable(e.to_string()))?;
                let value: Value =
                    serde_json::from_str(&content).map_err(|e| unreadable(e.to_string()))?;
                Metadata::from_value(value).ok_or_else(|| MetadataError::FileNotObject(display.clone()))
            }
            Self::Json(text) => {
                let value: Value = serde_json::from_str(&text)
                    .map_err(|e| MetadataError::InvalidJson(e.to_string()))?;
                Metadata::from_value(value).ok_or(MetadataError::NotObject)
            }
            Self::Value(value) => Metadata::from_value(value).ok_or(MetadataError::NotObject),
        }
    }
}

/// One submission to validate.
#[derive(Debug, Clone)]
pub struct ValidationInput {
    /// Submission metadata.
    pub metadata: MetadataSource,
    /// Directory holding the sequencing files. Defaults to the metadata
    /// file's directory for file input.
    pub data_dir: Option<PathBuf>,
    /// Where detailed log output is written, cited in fault messages.
    pub log_file: Option<PathBuf>,
}

impl ValidationInput {
    /// Validate a metadata file.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::from_source(MetadataSource::File(path.into()))
    }

    /// Validate a metadata JSON string.
    #[must_use]
    pub fn json(text: impl Into<String>) -> Self {
        Self::from_source(MetadataSource::Json(text.into()))
    }

    /// Validate an already-parsed metadata value.
    #[must_use]
    pub fn value(value: Value) -> Self {
        Self::from_source(MetadataSource::Value(value))
    }

    fn from_source(metadata: MetadataSource) -> Self {
        Self {
            metadata,
            data_dir: None,
            log_file: None,
        }
    }

    /// Use an explicit data directory.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Record the log file location.
    #[must_use]
    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The validation orchestrator.
pub struct ValidationEngine {
    registry: CheckerRegistry,
    filter: CheckerFilter,
    tools: Arc<dyn SeqTools>,
}

impl ValidationEngine {
    /// Create an engine with the built-in checkers.
    ///
    /// # Errors
    ///
    /// Returns an error if a `select`/`skip` pattern is not a valid glob.
    pub fn new(config: &ValidationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            registry: CheckerRegistry::new(),
            filter: config.checker_filter()?,
            tools: Arc::new(Samtools::new(config.samtools.clone())),
        })
    }

    /// Replace the registered checkers.
    #[must_use]
    pub fn with_checkers(mut self, checkers: Vec<Box<dyn Checker>>) -> Self {
        self.registry = CheckerRegistry::from_checkers(checkers);
        self
    }

    /// Replace the external tool runner.
    #[must_use]
    pub fn with_tools(mut self, tools: Arc<dyn SeqTools>) -> Self {
        self.tools = tools;
        self
    }

    /// The registered checkers.
    #[must_use]
    pub fn registry(&self) -> &CheckerRegistry {
        &self.registry
    }

    /// Run the applicable checkers over a prepared context.
    ///
    /// Always returns a result: blocked and faulted checkers are recorded
    /// as `UNKNOWN` and the loop carries on.
    #[must_use]
    pub fn run(&self, mut ctx: ValidationContext) -> ValidationResult {
        let checkers = self
            .registry
            .ordered(ctx.data_dir().is_some(), &self.filter);
        log::debug!("running {} checker(s)", checkers.len());

        for checker in checkers {
            let outcome = match gate::evaluate(checker.name(), checker.depends_on(), ctx.records())
            {
                GateDecision::Blocked(outcome) => outcome,
                GateDecision::Proceed => run_guarded(checker, &ctx),
            };
            log::info!("[{}] {}: {}", checker.name(), outcome.status, outcome.message);
            ctx.push_record(CheckRecord::new(
                checker.name(),
                outcome.status,
                outcome.message,
            ));
        }

        let checks = ctx.into_records();
        ValidationResult {
            status: aggregate_records(&checks),
            checks,
        }
    }

    /// Validate one submission and build its report.
    #[must_use]
    pub fn validate(&self, input: ValidationInput) -> ValidationReport {
        let started_at = utc_now_iso();
        let ValidationInput {
            metadata,
            data_dir,
            log_file,
        } = input;

        let (metadata_file, default_dir, lists_files) = match &metadata {
            MetadataSource::File(path) => {
                let abs = absolute(path);
                let parent = abs.parent().map(Path::to_path_buf);
                (Some(abs.display().to_string()), parent, true)
            }
            MetadataSource::Json(_) => (Some(STRING_METADATA_LABEL.to_owned()), None, false),
            MetadataSource::Value(_) => (None, None, false),
        };

        let data_dir = data_dir.map(|d| absolute(&d)).or(default_dir);
        let data_files = data_dir
            .as_deref()
            .map(discover_data_files)
            .unwrap_or_default();
        let report_files = lists_files.then(|| data_files.clone());

        let (status, message, checks) = match metadata.load() {
            Err(err) => {
                log::info!("{err}");
                (CheckStatus::Invalid, err.to_string(), Vec::new())
            }
            Ok(metadata) => {
                let mut ctx = ValidationContext::new(metadata)
                    .with_tools(Arc::clone(&self.tools))
                    .with_log_file(log_file);
                if let Some(ref dir) = data_dir {
                    ctx = ctx.with_data_dir(dir.clone(), data_files);
                }
                let result = self.run(ctx);
                (result.status, DEFAULT_REPORT_MESSAGE.to_owned(), result.checks)
            }
        };

        match metadata_file {
            Some(ref file) if lists_files => {
                log::info!("Validation completed for '{file}', status: {status}");
            }
            _ => log::info!("Validation completed for the input metadata, status: {status}"),
        }

        ValidationReport {
            tool: ToolInfo::default(),
            metadata_file,
            data_dir: data_dir.map(|d| d.display().to_string()),
            data_files: report_files,
            started_at,
            ended_at: utc_now_iso(),
            validation: ValidationSection {
                status,
                message,
                checks,
            },
        }
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self {
            registry: CheckerRegistry::new(),
            filter: CheckerFilter::default(),
            tools: Arc::new(Samtools::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::FakeTools;
    use crate::checkers::{CheckError, CheckOutcome};
    use indoc::indoc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A submission that satisfies every built-in checker.
    const VALID_METADATA: &str = indoc! {r#"
        {
          "submitterId": "S001",
          "read_group_count": 2,
          "experiment": {"platform": "ILLUMINA", "sequencing_center": "OICR"},
          "samples": [{"submitterSampleId": "HCC1143"}],
          "read_groups": [
            {
              "submitter_read_group_id": "C0HVY.2",
              "platform_unit": "74_8a",
              "library_name": "lib1",
              "is_paired_end": true,
              "file_r1": "test_rg.bam",
              "file_r2": "test_rg.bam",
              "read_group_id_in_bam": null
            },
            {
              "submitter_read_group_id": "D0RE2.1",
              "platform_unit": "74_8b",
              "library_name": "lib1",
              "is_paired_end": true,
              "file_r1": "test_rg.bam",
              "file_r2": "test_rg.bam"
            }
          ],
          "files": [
            {
              "fileName": "test_rg.bam",
              "fileSize": 12,
              "dataType": "Submitted Reads",
              "info": {"data_category": "Sequencing Reads"}
            }
          ]
        }
    "#};

    const BAM_CONTENT: &str = "BAM-CONTENT\n";

    const BAM_HEADER: &str = "@HD\tVN:1.6\n\
        @RG\tID:C0HVY.2\tSM:HCC1143\tLB:lib1\tPL:ILLUMINA\tCN:OICR\tPU:74_8a\n\
        @RG\tID:D0RE2.1\tSM:HCC1143\tLB:lib1\tPL:ILLUMINA\tPU:74_8b\n";

    // -- stub checkers ------------------------------------------------------

    struct Stub {
        name: &'static str,
        status: CheckStatus,
        depends_on: &'static [&'static str],
        calls: Arc<AtomicUsize>,
    }

    impl Stub {
        fn new(name: &'static str, status: CheckStatus) -> Self {
            Self {
                name,
                status,
                depends_on: &[],
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn depending_on(mut self, deps: &'static [&'static str]) -> Self {
            self.depends_on = deps;
            self
        }
    }

    impl Checker for Stub {
        fn name(&self) -> &'static str {
            self.name
        }
        fn depends_on(&self) -> &'static [&'static str] {
            self.depends_on
        }
        fn check(&self, _ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CheckOutcome::with_status(self.status, format!("{} ran", self.name)))
        }
    }

    struct Panicking;

    impl Checker for Panicking {
        fn name(&self) -> &'static str {
            "c150_panics"
        }
        fn check(&self, _ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
            let empty: Vec<u8> = Vec::new();
            let _ = empty[3];
            Ok(CheckOutcome::pass("unreachable"))
        }
    }

    struct Faulting;

    impl Checker for Faulting {
        fn name(&self) -> &'static str {
            "c160_faults"
        }
        fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
            ctx.metadata().require_files()?;
            Ok(CheckOutcome::pass("unreachable"))
        }
    }

    fn engine_with(checkers: Vec<Box<dyn Checker>>) -> ValidationEngine {
        ValidationEngine::default().with_checkers(checkers)
    }

    fn empty_ctx() -> ValidationContext {
        ValidationContext::new(Metadata::default())
    }

    fn statuses(result: &ValidationResult) -> Vec<(&str, CheckStatus)> {
        result
            .checks
            .iter()
            .map(|r| (r.checker.as_str(), r.status))
            .collect()
    }

    // -- orchestration properties --------------------------------------------

    #[test]
    fn test_one_record_per_checker_in_order() {
        let engine = engine_with(vec![
            Box::new(Stub::new("c120_b", CheckStatus::Warning)),
            Box::new(Stub::new("c110_a", CheckStatus::Pass)),
        ]);
        let result = engine.run(empty_ctx());
        assert_eq!(
            statuses(&result),
            vec![("c110_a", CheckStatus::Pass), ("c120_b", CheckStatus::Warning)]
        );
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[test]
    fn test_dependency_short_circuit_skips_body() {
        let blocked = Stub::new("c200_x", CheckStatus::Pass).depending_on(&["c100_y"]);
        let calls = Arc::clone(&blocked.calls);
        let engine = engine_with(vec![
            Box::new(Stub::new("c100_y", CheckStatus::Invalid)),
            Box::new(blocked),
        ]);

        let result = engine.run(empty_ctx());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let x = &result.checks[1];
        assert_eq!(x.checker, "c200_x");
        assert_eq!(x.status, CheckStatus::Unknown);
        assert!(x.message.contains("c100_y: INVALID"));
        assert_eq!(result.status, CheckStatus::Invalid);
    }

    #[test]
    fn test_warning_dependency_also_blocks() {
        let engine = engine_with(vec![
            Box::new(Stub::new("c100_y", CheckStatus::Warning)),
            Box::new(Stub::new("c200_x", CheckStatus::Pass).depending_on(&["c100_y"])),
        ]);
        let result = engine.run(empty_ctx());
        assert_eq!(result.checks[1].status, CheckStatus::Unknown);
        assert_eq!(result.status, CheckStatus::Unknown);
    }

    #[test]
    fn test_self_and_forward_dependencies_are_inert() {
        let self_dep = Stub::new("c100_self", CheckStatus::Pass).depending_on(&["c100_self"]);
        let forward = Stub::new("c110_fwd", CheckStatus::Pass).depending_on(&["c300_later"]);
        let (self_calls, fwd_calls) = (Arc::clone(&self_dep.calls), Arc::clone(&forward.calls));
        let engine = engine_with(vec![
            Box::new(self_dep),
            Box::new(forward),
            Box::new(Stub::new("c300_later", CheckStatus::Invalid)),
        ]);

        let result = engine.run(empty_ctx());
        assert_eq!(self_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fwd_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.checks[0].status, CheckStatus::Pass);
        assert_eq!(result.checks[1].status, CheckStatus::Pass);
    }

    #[test]
    fn test_faults_are_contained() {
        let after = Stub::new("c170_after", CheckStatus::Pass);
        let after_calls = Arc::clone(&after.calls);
        let engine = engine_with(vec![
            Box::new(Panicking),
            Box::new(Faulting),
            Box::new(after),
        ]);

        let result = engine.run(empty_ctx());
        assert_eq!(
            statuses(&result),
            vec![
                ("c150_panics", CheckStatus::Unknown),
                ("c160_faults", CheckStatus::Unknown),
                ("c170_after", CheckStatus::Pass),
            ]
        );
        assert_eq!(after_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.status, CheckStatus::Unknown);
    }

    #[test]
    fn test_every_checker_faulting_still_yields_result() {
        let engine = engine_with(vec![Box::new(Panicking), Box::new(Faulting)]);
        let result = engine.run(empty_ctx());
        assert_eq!(result.checks.len(), 2);
        assert!(result.checks.iter().all(|r| r.status == CheckStatus::Unknown));
    }

    #[test]
    fn test_no_data_dir_filters_file_checkers() {
        let file_checker = Stub::new("c605_needs_files", CheckStatus::Pass);
        let calls = Arc::clone(&file_checker.calls);
        let engine = engine_with(vec![
            Box::new(Stub::new("c110_a", CheckStatus::Pass)),
            Box::new(file_checker),
        ]);

        let result = engine.run(empty_ctx());
        assert_eq!(statuses(&result), vec![("c110_a", CheckStatus::Pass)]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let ctx = empty_ctx().with_data_dir(PathBuf::from("/data"), Vec::new());
        assert_eq!(engine.run(ctx).checks.len(), 2);
    }

    #[test]
    fn test_no_checkers_is_unknown() {
        let result = engine_with(Vec::new()).run(empty_ctx());
        assert!(result.checks.is_empty());
        assert_eq!(result.status, CheckStatus::Unknown);
    }

    #[test]
    fn test_config_skip_removes_checker_and_its_gate() {
        let config = ValidationConfig {
            skip: vec!["c100_*".to_owned()],
            ..ValidationConfig::default()
        };
        let engine = ValidationEngine::new(&config).unwrap().with_checkers(vec![
            Box::new(Stub::new("c100_y", CheckStatus::Invalid)),
            Box::new(Stub::new("c200_x", CheckStatus::Pass).depending_on(&["c100_y"])),
        ]);
        let result = engine.run(empty_ctx());
        assert_eq!(statuses(&result), vec![("c200_x", CheckStatus::Pass)]);
    }

    // -- built-in checkers, end to end ---------------------------------------

    #[test]
    fn test_empty_object_metadata_is_invalid() {
        let report = ValidationEngine::default().validate(ValidationInput::json("{}"));
        assert_eq!(report.status(), CheckStatus::Invalid);
        let c110 = report.check("c110_rg_id_uniqueness").unwrap();
        assert_eq!(c110.status, CheckStatus::Invalid);
        assert!(c110.message.contains("read_groups"));
        assert!(report
            .validation
            .checks
            .iter()
            .all(|r| !r.checker.starts_with("c6")));
    }

    #[test]
    fn test_duplicate_read_group_id_is_invalid() {
        let mut md: Value = serde_json::from_str(VALID_METADATA).unwrap();
        md["read_groups"][1]["submitter_read_group_id"] = Value::from("C0HVY.2");
        let report = ValidationEngine::default().validate(ValidationInput::value(md));

        let c110 = report.check("c110_rg_id_uniqueness").unwrap();
        assert_eq!(c110.status, CheckStatus::Invalid);
        assert!(c110.message.contains("C0HVY.2"));
        assert_eq!(report.status(), CheckStatus::Invalid);

        let c240 = report
            .check("c240_submitter_rg_id_collide_with_rg_id_in_bam")
            .unwrap();
        assert_eq!(c240.status, CheckStatus::Unknown);
        assert!(c240.message.contains("c110_rg_id_uniqueness: INVALID"));
    }

    #[test]
    fn test_valid_metadata_without_data_dir_passes() {
        let report = ValidationEngine::default().validate(ValidationInput::json(VALID_METADATA));
        for record in &report.validation.checks {
            assert_eq!(record.status, CheckStatus::Pass, "{record:?}");
            assert!(!crate::checkers::requires_data_dir_by_code(&record.checker));
        }
        assert_eq!(report.status(), CheckStatus::Pass);
        assert_eq!(report.validation.message, DEFAULT_REPORT_MESSAGE);
        assert_eq!(report.metadata_file.as_deref(), Some(STRING_METADATA_LABEL));
        assert!(report.data_dir.is_none());
        assert!(report.data_files.is_none());
        assert_eq!(
            report.validation.checks.len(),
            CheckerRegistry::new().ordered(false, &CheckerFilter::default()).len()
        );
    }

    #[test]
    fn test_valid_submission_with_data_dir_passes() {
        let dir = tempfile::tempdir().unwrap();
        let metadata_path = dir.path().join("metadata.json");
        std::fs::write(&metadata_path, VALID_METADATA).unwrap();
        std::fs::write(dir.path().join("test_rg.bam"), BAM_CONTENT).unwrap();

        let tools = FakeTools::default().with_header("test_rg.bam", BAM_HEADER);
        let engine = ValidationEngine::default().with_tools(Arc::new(tools));
        let report = engine.validate(ValidationInput::file(&metadata_path));

        for record in &report.validation.checks {
            assert_eq!(record.status, CheckStatus::Pass, "{record:?}");
        }
        assert_eq!(report.status(), CheckStatus::Pass);
        assert!(report.check("c660_metadata_in_bam_rg_header").is_some());
        assert_eq!(report.data_files, Some(vec!["test_rg.bam".to_owned()]));
        let expected_dir = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(report.data_dir, Some(expected_dir.display().to_string()));
    }

    #[test]
    fn test_missing_data_file_blocks_file_checkers() {
        let dir = tempfile::tempdir().unwrap();
        let metadata_path = dir.path().join("metadata.json");
        std::fs::write(&metadata_path, VALID_METADATA).unwrap();

        let report = ValidationEngine::default()
            .with_tools(Arc::new(FakeTools::default()))
            .validate(ValidationInput::file(&metadata_path));

        let c605 = report.check("c605_all_files_accessible").unwrap();
        assert_eq!(c605.status, CheckStatus::Invalid);
        let c681 = report.check("c681_file_size_match").unwrap();
        assert_eq!(c681.status, CheckStatus::Unknown);
        assert!(c681.message.contains("c605_all_files_accessible: INVALID"));
        assert_eq!(report.status(), CheckStatus::Invalid);
    }

    #[test]
    fn test_tool_fault_points_at_log_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test_rg.bam"), BAM_CONTENT).unwrap();
        let log_file = dir.path().join("logs").join("run.log");

        let report = ValidationEngine::default()
            .with_tools(Arc::new(FakeTools::default()))
            .validate(
                ValidationInput::json(VALID_METADATA)
                    .with_data_dir(dir.path())
                    .with_log_file(Some(log_file.clone())),
            );

        let c610 = report.check("c610_rg_id_in_bam").unwrap();
        assert_eq!(c610.status, CheckStatus::Unknown);
        assert!(c610.message.contains(&log_file.display().to_string()));
        assert!(report.data_files.is_none());
    }

    // -- structural failures ---------------------------------------------------

    #[test]
    fn test_invalid_json_string() {
        let report = ValidationEngine::default().validate(ValidationInput::json("{not json"));
        assert_eq!(report.status(), CheckStatus::Invalid);
        assert!(report.validation.checks.is_empty());
        assert!(report
            .validation
            .message
            .starts_with("Unable to load metadata, please ensure it's a valid JSON string."));
    }

    #[test]
    fn test_non_object_json_string() {
        let report = ValidationEngine::default().validate(ValidationInput::json("[1, 2]"));
        assert_eq!(report.status(), CheckStatus::Invalid);
        assert!(report.validation.checks.is_empty());
        assert_eq!(
            report.validation.message,
            MetadataError::NotObject.to_string()
        );
    }

    #[test]
    fn test_unreadable_metadata_file() {
        let report = ValidationEngine::default()
            .validate(ValidationInput::file("/nonexistent/metadata.json"));
        assert_eq!(report.status(), CheckStatus::Invalid);
        assert!(report.validation.checks.is_empty());
        assert!(report
            .validation
            .message
            .starts_with("Failed to open '/nonexistent/metadata.json'."));
    }

    #[test]
    fn test_non_object_metadata_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "\"just a string\"").unwrap();
        let report = ValidationEngine::default().validate(ValidationInput::file(&path));
        assert_eq!(report.status(), CheckStatus::Invalid);
        assert!(report.validation.message.contains("is not a JSON object"));
    }

    #[test]
    fn test_timestamps_format() {
        let ts = utc_now_iso();
        assert_eq!(ts.len(), "2024-05-01T12:00:00.123Z".len());
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }
}
