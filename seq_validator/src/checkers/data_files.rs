//! Data-directory checkers: c605, c681, c685.
//!
//! These read the submitted files from disk. Sizes and digests are computed
//! in parallel with rayon; each checker still returns a single outcome.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};
use rayon::prelude::*;
use serde_json::Value;

use crate::checkers::{CheckError, CheckOutcome, Checker};
use crate::context::{require_str, ValidationContext};
use crate::types::CheckStatus;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

fn io_error(path: &Path, source: std::io::Error) -> CheckError {
    CheckError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Size of a file in bytes, following symlinks.
pub(crate) fn file_size(path: &Path) -> Result<u64, CheckError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| io_error(path, e))
}

/// Lower-case hex MD5 digest of a file's content.
pub(crate) fn file_md5(path: &Path) -> Result<String, CheckError> {
    let mut file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| io_error(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Render a metadata value the way it appears in mismatch messages.
fn shown(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `"[file: detail, detail]; [file: detail]"`, files sorted.
fn format_mismatches(mismatches: &BTreeMap<String, Vec<String>>) -> String {
    mismatches
        .iter()
        .map(|(file, details)| format!("[{file}: {}]", details.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// c605
// ---------------------------------------------------------------------------

/// Every file named in the metadata exists in the data directory and is readable.
pub struct AllFilesAccessible;

impl Checker for AllFilesAccessible {
    fn name(&self) -> &'static str {
        "c605_all_files_accessible"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        if ctx.data_dir().is_none() {
            return Ok(CheckOutcome::with_status(
                CheckStatus::Unknown,
                "No file information available in the submission directory. This is likely a \
                 metadata only validation, should not have invoked this checker. Please ignore.",
            ));
        }

        let mut missing = Vec::new();
        let mut unreadable = Vec::new();
        for file in ctx.metadata().require_files()? {
            let name = require_str(file, "files", "fileName")?;
            if !ctx.data_files().iter().any(|f| f == name) {
                missing.push(name);
            } else if let Err(e) = File::open(ctx.data_path(name)?) {
                log::debug!("[{}] cannot open {name}: {e}", self.name());
                unreadable.push(name);
            }
        }
        missing.sort_unstable();
        unreadable.sort_unstable();

        if !missing.is_empty() {
            return Ok(CheckOutcome::invalid(format!(
                "Files specified in metadata, but missed in submission directory: '{}'",
                missing.join(", ")
            )));
        }
        if !unreadable.is_empty() {
            return Ok(CheckOutcome::invalid(format!(
                "Files specified in metadata, but inaccessible in submission directory: '{}'",
                unreadable.join(", ")
            )));
        }
        Ok(CheckOutcome::pass("All submission files accessible check: PASS"))
    }
}

// ---------------------------------------------------------------------------
// c681
// ---------------------------------------------------------------------------

/// `fileSize` in the metadata equals the size on disk.
pub struct FileSizeMatch;

impl Checker for FileSizeMatch {
    fn name(&self) -> &'static str {
        "c681_file_size_match"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c180_file_uniqueness", "c605_all_files_accessible"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let files = ctx.metadata().require_files()?;
        let data_dir = ctx.require_data_dir()?;

        let measured = files
            .par_iter()
            .map(|file| {
                let name = require_str(file, "files", "fileName")?;
                let size = file_size(&data_dir.join(name))?;
                Ok((name, size, file.get("fileSize")))
            })
            .collect::<Result<Vec<_>, CheckError>>()?;

        let mut mismatches: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, size, declared) in measured {
            if declared.and_then(Value::as_u64) != Some(size) {
                mismatches
                    .entry(name.to_owned())
                    .or_default()
                    .push(format!("fileSize: {size} vs {}", shown(declared)));
            }
        }

        if mismatches.is_empty() {
            Ok(CheckOutcome::pass(
                "The fileSize calculated from the sequencing files matches the info provided in \
                 metadata JSON: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "The fileSize calculated from the sequencing files does NOT match the info \
                 provided in metadata JSON. Details of the difference: {}",
                format_mismatches(&mismatches)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c685
// ---------------------------------------------------------------------------

/// Files converted from CRAM carry `info.original_cram_info`, whose
/// `fileMd5sum` and `fileSize` must match the file named there.
pub struct NestedCramMd5AndSizeMatch;

struct CramCheck<'a> {
    file_name: &'a str,
    size: u64,
    md5: String,
    declared_size: Option<&'a Value>,
    declared_md5: Option<&'a Value>,
}

impl Checker for NestedCramMd5AndSizeMatch {
    fn name(&self) -> &'static str {
        "c685_nested_cram_md5_and_size_match"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c180_file_uniqueness", "c605_all_files_accessible"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let nested: Vec<&Value> = ctx
            .metadata()
            .require_files()?
            .iter()
            .filter_map(|file| file.get("info")?.get("original_cram_info"))
            .filter(|info| !info.is_null())
            .collect();

        if nested.is_empty() {
            return Ok(CheckOutcome::pass("No nested cram info to check: PASS"));
        }

        let data_dir = ctx.require_data_dir()?;
        let checked = nested
            .par_iter()
            .map(|info| {
                let file_name = require_str(info, "files.info.original_cram_info", "fileName")?;
                let path = data_dir.join(file_name);
                Ok(CramCheck {
                    file_name,
                    size: file_size(&path)?,
                    md5: file_md5(&path)?,
                    declared_size: info.get("fileSize"),
                    declared_md5: info.get("fileMd5sum"),
                })
            })
            .collect::<Result<Vec<_>, CheckError>>()?;

        let mut size_mismatches: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut md5_mismatches: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for c in checked {
            if c.declared_size.and_then(Value::as_u64) != Some(c.size) {
                size_mismatches
                    .entry(c.file_name.to_owned())
                    .or_default()
                    .push(format!("fileSize: {} vs {}", c.size, shown(c.declared_size)));
            }
            if c.declared_md5.and_then(Value::as_str) != Some(c.md5.as_str()) {
                md5_mismatches
                    .entry(c.file_name.to_owned())
                    .or_default()
                    .push(format!("fileMd5sum: {} vs {}", c.md5, shown(c.declared_md5)));
            }
        }

        if size_mismatches.is_empty() && md5_mismatches.is_empty() {
            return Ok(CheckOutcome::pass(
                "The fileMd5sum and fileSize calculated from the sequencing files matches the \
                 info provided in metadata JSON: PASS",
            ));
        }

        let details: Vec<String> = [&size_mismatches, &md5_mismatches]
            .into_iter()
            .filter(|m| !m.is_empty())
            .map(format_mismatches)
            .collect();
        Ok(CheckOutcome::invalid(format!(
            "The following fields calculated from the sequencing files does NOT match the info \
             provided in metadata JSON. Details of the difference: {}",
            details.join("; ")
        )))
    }
}
