//! Shared state of one validation run.
//!
//! The [`ValidationContext`] owns the parsed metadata document, the optional
//! data directory with its discovered sequencing files, the log file location
//! and the append-only list of [`CheckRecord`]s. Checkers only ever see it
//! through a shared reference; the engine is the single writer of records.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::checkers::CheckError;
use crate::tools::{SeqTools, Samtools};
use crate::types::CheckRecord;

/// The submission metadata document, guaranteed to be a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Wrap a JSON value, returning `None` if it is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Raw access to a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `read_groups` section, or `None` when missing, not a list, or empty.
    #[must_use]
    pub fn read_groups(&self) -> Option<&[Value]> {
        self.non_empty_array("read_groups")
    }

    /// The `files` section, or `None` when missing, not a list, or empty.
    #[must_use]
    pub fn files(&self) -> Option<&[Value]> {
        self.non_empty_array("files")
    }

    /// The `samples` section, or `None` when missing, not a list, or empty.
    #[must_use]
    pub fn samples(&self) -> Option<&[Value]> {
        self.non_empty_array("samples")
    }

    /// The `experiment` section, if it is an object.
    #[must_use]
    pub fn experiment(&self) -> Option<&Map<String, Value>> {
        self.0.get("experiment").and_then(Value::as_object)
    }

    /// The `read_groups` section, as a fault when absent.
    ///
    /// For checkers whose prerequisites already report the missing section.
    pub fn require_read_groups(&self) -> Result<&[Value], CheckError> {
        self.read_groups()
            .ok_or_else(|| CheckError::MissingSection("read_groups".to_owned()))
    }

    /// The `files` section, as a fault when absent.
    pub fn require_files(&self) -> Result<&[Value], CheckError> {
        self.files()
            .ok_or_else(|| CheckError::MissingSection("files".to_owned()))
    }

    fn non_empty_array(&self, key: &str) -> Option<&[Value]> {
        match self.0.get(key) {
            Some(Value::Array(items)) if !items.is_empty() => Some(items.as_slice()),
            _ => None,
        }
    }
}

/// A string field of a JSON object, `None` when absent, null, or not a string.
#[must_use]
pub fn str_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

/// A populated string field: `None` when absent, null or empty.
///
/// A non-string value is a fault, not an unpopulated field.
pub fn populated_str<'a>(
    entry: &'a Value,
    section: &str,
    key: &str,
) -> Result<Option<&'a str>, CheckError> {
    match entry.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(CheckError::UnexpectedType {
            field: format!("{section}.{key}"),
            expected: "string",
            found: json_type_name(other),
        }),
    }
}

/// A string field that must be present, as a fault otherwise.
pub fn require_str<'a>(entry: &'a Value, section: &str, key: &str) -> Result<&'a str, CheckError> {
    match entry.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(CheckError::UnexpectedType {
            field: format!("{section}.{key}"),
            expected: "string",
            found: json_type_name(other),
        }),
        None => Err(CheckError::MissingField(format!("{section}.{key}"))),
    }
}

/// Short JSON type name for diagnostics.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Everything a checker can read during a run.
pub struct ValidationContext {
    metadata: Metadata,
    data_dir: Option<PathBuf>,
    data_files: Vec<String>,
    log_file: Option<PathBuf>,
    tools: Arc<dyn SeqTools>,
    records: Vec<CheckRecord>,
}

impl ValidationContext {
    /// Create a metadata-only context (no data directory).
    #[must_use]
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            data_dir: None,
            data_files: Vec::new(),
            log_file: None,
            tools: Arc::new(Samtools::default()),
            records: Vec::new(),
        }
    }

    /// Attach a data directory and the sequencing files found in it.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: PathBuf, data_files: Vec<String>) -> Self {
        self.data_dir = Some(data_dir);
        self.data_files = data_files;
        self
    }

    /// Record where detailed log output is written.
    #[must_use]
    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    /// Replace the external tool runner.
    #[must_use]
    pub fn with_tools(mut self, tools: Arc<dyn SeqTools>) -> Self {
        self.tools = tools;
        self
    }

    /// The submission metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The data directory, if one was supplied.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// The data directory, as a fault for file checkers run without one.
    pub fn require_data_dir(&self) -> Result<&Path, CheckError> {
        self.data_dir.as_deref().ok_or(CheckError::NoDataDirectory)
    }

    /// Sequencing file names discovered in the data directory, sorted.
    #[must_use]
    pub fn data_files(&self) -> &[String] {
        &self.data_files
    }

    /// Path of a file inside the data directory.
    pub fn data_path(&self, file_name: &str) -> Result<PathBuf, CheckError> {
        Ok(self.require_data_dir()?.join(file_name))
    }

    /// Detailed log file location, if logging to a file.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// External tool runner (samtools).
    #[must_use]
    pub fn tools(&self) -> &dyn SeqTools {
        self.tools.as_ref()
    }

    /// Records appended so far, in execution order.
    #[must_use]
    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }

    /// Append a finalized record.
    pub(crate) fn push_record(&mut self, record: CheckRecord) {
        self.records.push(record);
    }

    /// Hand the records over once the run is complete.
    pub(crate) fn into_records(self) -> Vec<CheckRecord> {
        self.records
    }
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("data_dir", &self.data_dir)
            .field("data_files", &self.data_files)
            .field("log_file", &self.log_file)
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}
