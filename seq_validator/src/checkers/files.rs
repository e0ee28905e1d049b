//! `files` section checkers: c160, c170, c180, c190, c210, c230, c250, c260.
//!
//! These cross-reference the `files` list with the file names cited by
//! read groups. None of them touch the data directory.

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::checkers::{CheckError, CheckOutcome, Checker};
use crate::context::{populated_str, require_str, str_field, ValidationContext};

const MISSING_READ_GROUPS: &str = "Missing 'read_groups' section in the metadata JSON";
const MISSING_FILES: &str = "Missing 'files' section in the metadata JSON";
const MISSING_FILE_NAME: &str = "Required field 'fileName' is not found in metadata JSON.";

/// Accepted submitted file name pattern.
pub(crate) const FILENAME_PATTERN: &str =
    r"^[A-Za-z0-9]{1}[A-Za-z0-9_\.\-]*\.(bam|fq\.gz|fastq\.gz|fq\.bz2|fastq\.bz2)$";

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FILENAME_PATTERN).expect("file name regex is valid"))
}

/// Whether a file name denotes compressed FASTQ.
fn is_fastq(name: &str) -> bool {
    name.ends_with(".gz") || name.ends_with(".bz2")
}

/// Every `fileName` in the `files` section, or `None` if one is unpopulated.
fn file_names(files: &[Value]) -> Result<Option<Vec<&str>>, CheckError> {
    let mut names = Vec::with_capacity(files.len());
    for file in files {
        match populated_str(file, "files", "fileName")? {
            Some(name) => names.push(name),
            None => return Ok(None),
        }
    }
    Ok(Some(names))
}

fn joined<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// c160
// ---------------------------------------------------------------------------

/// `file_r1`/`file_r2` are consistent with `is_paired_end` and listed in `files`.
pub struct FileR1R2Check;

impl Checker for FileR1R2Check {
    fn name(&self) -> &'static str {
        "c160_file_r1_r2_check"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let metadata = ctx.metadata();
        let Some(read_groups) = metadata.read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };
        let Some(files) = metadata.files() else {
            return Ok(CheckOutcome::invalid(MISSING_FILES));
        };

        let mut referenced = BTreeSet::new();
        for rg in read_groups {
            let rg_id = str_field(rg, "submitter_read_group_id").unwrap_or("<unnamed>");

            let paired = match rg.get("is_paired_end") {
                None => {
                    return Ok(CheckOutcome::invalid(format!(
                        "Required field 'is_paired_end' is not found in metadata JSON in read group: {rg_id}."
                    )))
                }
                Some(Value::Bool(b)) => *b,
                Some(_) => {
                    return Ok(CheckOutcome::invalid(format!(
                        "Required field 'is_paired_end' should be Boolean type in read group: {rg_id}."
                    )))
                }
            };

            let Some(r1) = populated_str(rg, "read_groups", "file_r1")? else {
                return Ok(CheckOutcome::invalid(format!(
                    "Required field 'file_r1' is not found in metadata JSON in read group: {rg_id}."
                )));
            };
            let r2 = populated_str(rg, "read_groups", "file_r2")?;

            if paired {
                let Some(r2) = r2 else {
                    return Ok(CheckOutcome::invalid(format!(
                        "Required field 'file_r2' is not found in metadata JSON for paired end \
                         sequencing reads in read group: {rg_id}."
                    )));
                };
                let is_bam = r1.ends_with(".bam");
                if is_bam && r1 != r2 {
                    return Ok(CheckOutcome::invalid(format!(
                        "Fields 'file_r1' and 'file_r2' should be the same for paired end BAM \
                         sequencing reads in read group: {rg_id}."
                    )));
                }
                if !is_bam && r1 == r2 {
                    return Ok(CheckOutcome::invalid(format!(
                        "Fields 'file_r1' and 'file_r2' should NOT be the same for paired end \
                         FASTQ sequencing reads in read group: {rg_id}."
                    )));
                }
            } else if r2.is_some() {
                return Ok(CheckOutcome::invalid(format!(
                    "Field 'file_r2' must be 'null' in metadata JSON for single end sequencing \
                     in read group: {rg_id}."
                )));
            }

            referenced.insert(r1);
            referenced.extend(r2);
        }

        let Some(listed) = file_names(files)? else {
            return Ok(CheckOutcome::invalid(MISSING_FILE_NAME));
        };
        let listed: HashSet<&str> = listed.into_iter().collect();

        let missing: Vec<&str> = referenced
            .into_iter()
            .filter(|f| !listed.contains(f))
            .collect();
        if missing.is_empty() {
            Ok(CheckOutcome::pass("Fields file_r1 and file_r2 check status: PASS"))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "File(s) specified in 'file_r1' or 'file_r2' missed in 'files' section of the \
                 metadata JSON: {}",
                joined(missing)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c170
// ---------------------------------------------------------------------------

/// A FASTQ file is referenced by at most one read group.
pub struct FqUniquenessInRgs;

impl Checker for FqUniquenessInRgs {
    fn name(&self) -> &'static str {
        "c170_fq_uniqueness_in_rgs"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(read_groups) = ctx.metadata().read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };

        let mut seen = HashSet::new();
        let mut duplicated = BTreeSet::new();
        for rg in read_groups {
            if rg.get("file_r1").is_none() {
                return Ok(CheckOutcome::invalid(
                    "Required field 'file_r1' not found in metadata JSON",
                ));
            }
            let r1 = require_str(rg, "read_groups", "file_r1")?;
            if !is_fastq(r1) {
                continue;
            }
            let r2 = populated_str(rg, "read_groups", "file_r2")?.filter(|f| is_fastq(f));
            for fq in std::iter::once(r1).chain(r2) {
                if !seen.insert(fq) {
                    duplicated.insert(fq);
                }
            }
        }

        if duplicated.is_empty() {
            Ok(CheckOutcome::pass(
                "FASTQ uniqueness in read groups check status: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "FASTQ file(s) duplicated in 'file_r1/file_r2' of the 'read_groups' section in \
                 the metadata: '{}'",
                joined(duplicated)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c180
// ---------------------------------------------------------------------------

/// `files[].fileName` populated and unique.
pub struct FileUniqueness;

impl Checker for FileUniqueness {
    fn name(&self) -> &'static str {
        "c180_file_uniqueness"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(files) = ctx.metadata().files() else {
            return Ok(CheckOutcome::invalid(MISSING_FILES));
        };
        let Some(names) = file_names(files)? else {
            return Ok(CheckOutcome::invalid(MISSING_FILE_NAME));
        };

        let mut seen = HashSet::new();
        let duplicated: BTreeSet<&str> = names.into_iter().filter(|n| !seen.insert(*n)).collect();

        if duplicated.is_empty() {
            Ok(CheckOutcome::pass(
                "Files uniqueness check in files section status: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "File(s) duplicated in 'fileName' of the 'files' section in the metadata: '{}'",
                joined(duplicated)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c190
// ---------------------------------------------------------------------------

/// Every listed file is referenced by some read group.
pub struct NoExtraFiles;

impl Checker for NoExtraFiles {
    fn name(&self) -> &'static str {
        "c190_no_extra_files"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let metadata = ctx.metadata();
        let Some(read_groups) = metadata.read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };
        let Some(files) = metadata.files() else {
            return Ok(CheckOutcome::invalid(MISSING_FILES));
        };

        let mut referenced = HashSet::new();
        for rg in read_groups {
            referenced.extend(populated_str(rg, "read_groups", "file_r1")?);
            referenced.extend(populated_str(rg, "read_groups", "file_r2")?);
        }

        let Some(listed) = file_names(files)? else {
            return Ok(CheckOutcome::invalid(
                "Required field 'fileName' not populated in 'files' section of the metadata JSON.",
            ));
        };

        let extra: BTreeSet<&str> = listed
            .into_iter()
            .filter(|f| !referenced.contains(f))
            .collect();
        if extra.is_empty() {
            Ok(CheckOutcome::pass("No extra files check status: PASS"))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "Found extra files specified in 'files' section of the metadata JSON, please \
                 remove unneeded files: {} from the 'files' section of the metadata JSON",
                joined(extra)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c210
// ---------------------------------------------------------------------------

/// `fileName` carries no directory component.
pub struct NoPathInFilename;

impl Checker for NoPathInFilename {
    fn name(&self) -> &'static str {
        "c210_no_path_in_filename"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(files) = ctx.metadata().files() else {
            return Ok(CheckOutcome::invalid(MISSING_FILES));
        };
        let Some(names) = file_names(files)? else {
            return Ok(CheckOutcome::invalid(MISSING_FILE_NAME));
        };

        let with_path: BTreeSet<&str> = names.into_iter().filter(|n| n.contains('/')).collect();
        if with_path.is_empty() {
            Ok(CheckOutcome::pass(
                "No path in fileName check in 'files' section status: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'fileName' must NOT contain path in the 'files' section of the metadata, \
                 offending name(s): '{}'",
                joined(with_path)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c230
// ---------------------------------------------------------------------------

/// Files are categorized as `Sequencing Reads`. Advisory only.
pub struct FilesInfoDataCategory;

impl Checker for FilesInfoDataCategory {
    fn name(&self) -> &'static str {
        "c230_files_info_data_category"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let mut uncategorized = BTreeSet::new();
        for file in ctx.metadata().files().unwrap_or_default() {
            let category = file
                .get("info")
                .and_then(|info| info.get("data_category"))
                .and_then(Value::as_str);
            if category != Some("Sequencing Reads") {
                uncategorized.insert(require_str(file, "files", "fileName")?);
            }
        }

        if uncategorized.is_empty() {
            Ok(CheckOutcome::pass(
                "Field 'data_category' is found populated with 'Sequencing Reads'. Validation status: PASS",
            ))
        } else {
            Ok(CheckOutcome::warning(format!(
                "Field 'data_category' is NOT found or NOT populated with 'Sequencing Reads' for \
                 file(s): '{}'",
                joined(uncategorized)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c250
// ---------------------------------------------------------------------------

/// Every file has `dataType == "Submitted Reads"`.
pub struct FileDataType;

impl Checker for FileDataType {
    fn name(&self) -> &'static str {
        "c250_file_data_type"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c180_file_uniqueness"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let mut offending = BTreeSet::new();
        for file in ctx.metadata().require_files()? {
            if str_field(file, "dataType") != Some("Submitted Reads") {
                offending.insert(require_str(file, "files", "fileName")?);
            }
        }

        if offending.is_empty() {
            Ok(CheckOutcome::pass(
                "Field 'dataType' is found populated with 'Submitted Reads'. Validation status: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "All files in the 'files' section of the metadata JSON are required to have \
                 'dataType' field being populated with 'Submitted Reads'. File(s) found not \
                 conforming to this requirement: '{}'.",
                joined(offending)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c260
// ---------------------------------------------------------------------------

/// `fileName` follows the accepted naming pattern.
pub struct FilenamePattern;

impl Checker for FilenamePattern {
    fn name(&self) -> &'static str {
        "c260_filename_pattern"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c190_no_extra_files", "c210_no_path_in_filename"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(files) = ctx.metadata().files() else {
            return Ok(CheckOutcome::invalid(MISSING_FILES));
        };
        let Some(names) = file_names(files)? else {
            return Ok(CheckOutcome::invalid(
                "Required field 'fileName' is not found or not populated in 'files' section of \
                 the metadata JSON.",
            ));
        };

        let mismatched: BTreeSet<&str> = names
            .into_iter()
            .filter(|n| !filename_regex().is_match(n))
            .collect();
        if mismatched.is_empty() {
            Ok(CheckOutcome::pass(format!(
                "'fileName' matches expected pattern '{FILENAME_PATTERN}' in 'files' section. \
                 Validation status: PASS"
            )))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'fileName' must match expected pattern '{FILENAME_PATTERN}' in the 'files' \
                 section of the metadata, offending name(s): '{}'",
                joined(mismatched)
            )))
        }
    }
}
