//! Read-group checkers: c110, c120, c140, c150, c200, c220, c240.
//!
//! All of these look only at the `read_groups` section of the metadata.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::checkers::{push_unique, CheckError, CheckOutcome, Checker};
use crate::context::{json_type_name, require_str, ValidationContext};

const MISSING_READ_GROUPS: &str = "Missing 'read_groups' section in the metadata JSON";

/// The `read_group_id_in_bam` of a read group, `None` when absent or null.
pub(crate) fn rg_id_in_bam(rg: &Value) -> Result<Option<&str>, CheckError> {
    match rg.get("read_group_id_in_bam") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(CheckError::UnexpectedType {
            field: "read_groups.read_group_id_in_bam".to_owned(),
            expected: "string",
            found: json_type_name(other),
        }),
    }
}

/// Permissible read group id characters.
pub(crate) fn rg_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\-_:\.]+$").expect("read group id regex is valid"))
}

// ---------------------------------------------------------------------------
// c110
// ---------------------------------------------------------------------------

/// `submitter_read_group_id` present on every read group and unique.
pub struct RgIdUniqueness;

impl Checker for RgIdUniqueness {
    fn name(&self) -> &'static str {
        "c110_rg_id_uniqueness"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(read_groups) = ctx.metadata().read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };

        let mut seen = HashSet::new();
        let mut duplicated = Vec::new();
        for rg in read_groups {
            if rg.get("submitter_read_group_id").is_none() {
                return Ok(CheckOutcome::invalid(
                    "Required field 'submitter_read_group_id' not found in metadata JSON",
                ));
            }
            let id = require_str(rg, "read_groups", "submitter_read_group_id")?;
            if !seen.insert(id) {
                push_unique(&mut duplicated, id);
            }
        }

        if duplicated.is_empty() {
            Ok(CheckOutcome::pass("Read group ID uniqueness check status: PASS"))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'submitter_read_group_id' duplicated in metadata: '{}'",
                duplicated.join(", ")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c120
// ---------------------------------------------------------------------------

/// `submitter_read_group_id` uses permissible characters only.
pub struct PermissibleCharInRgId;

impl Checker for PermissibleCharInRgId {
    fn name(&self) -> &'static str {
        "c120_permissible_char_in_rg_id"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(read_groups) = ctx.metadata().read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };

        let mut offending = BTreeSet::new();
        for rg in read_groups {
            if rg.get("submitter_read_group_id").is_none() {
                return Ok(CheckOutcome::invalid(
                    "Required field 'submitter_read_group_id' not found in metadata JSON",
                ));
            }
            let id = require_str(rg, "read_groups", "submitter_read_group_id")?;
            if !rg_id_regex().is_match(id) {
                offending.insert(id);
            }
        }

        if offending.is_empty() {
            Ok(CheckOutcome::pass(
                "Read group ID permissible character check status: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'submitter_read_group_id' in metadata contains invalid character or is empty: '{}'. \
                 Permissible characters include: a-z, A-Z, 0-9, - (hyphen), _ (underscore), \
                 : (colon), . (dot)",
                offending.into_iter().collect::<Vec<_>>().join(", ")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c140
// ---------------------------------------------------------------------------

/// `platform_unit` present on every read group and unique.
pub struct PlatformUnitUniqueness;

impl Checker for PlatformUnitUniqueness {
    fn name(&self) -> &'static str {
        "c140_platform_unit_uniqueness"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(read_groups) = ctx.metadata().read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };

        let mut seen = HashSet::new();
        let mut duplicated = Vec::new();
        for rg in read_groups {
            if rg.get("platform_unit").is_none() {
                return Ok(CheckOutcome::invalid(
                    "Required field 'platform_unit' not found in metadata JSON",
                ));
            }
            let pu = require_str(rg, "read_groups", "platform_unit")?;
            if !seen.insert(pu) {
                push_unique(&mut duplicated, pu);
            }
        }

        if duplicated.is_empty() {
            Ok(CheckOutcome::pass("Platform unit uniqueness check status: PASS"))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'platform_unit' duplicated in metadata: '{}'",
                duplicated.join(", ")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c150
// ---------------------------------------------------------------------------

/// `read_group_count` matches the number of read groups.
pub struct RgCountMatch;

impl Checker for RgCountMatch {
    fn name(&self) -> &'static str {
        "c150_rg_count_match"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let metadata = ctx.metadata();
        let Some(read_groups) = metadata.read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };

        let declared = match metadata.get("read_group_count") {
            None | Some(Value::Null) => {
                return Ok(CheckOutcome::invalid(
                    "Missing 'read_group_count' field in the metadata JSON",
                ))
            }
            Some(v) => v,
        };

        // `2` and `2.0` both declare two read groups
        if declared.as_f64() == Some(read_groups.len() as f64) {
            Ok(CheckOutcome::pass("Read groups count check status: PASS"))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "The total number of read groups in 'read_groups' section is {}. It does NOT match \
                 the number specified in read_group_count: {declared}.",
                read_groups.len()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c200
// ---------------------------------------------------------------------------

/// Populated `read_group_id_in_bam` values are unique.
pub struct RgIdInBamUniqueness;

impl Checker for RgIdInBamUniqueness {
    fn name(&self) -> &'static str {
        "c200_rg_id_in_bam_uniqueness"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let Some(read_groups) = ctx.metadata().read_groups() else {
            return Ok(CheckOutcome::invalid(MISSING_READ_GROUPS));
        };

        let mut seen = HashSet::new();
        let mut duplicated = Vec::new();
        for rg in read_groups {
            if let Some(id) = rg_id_in_bam(rg)? {
                if !seen.insert(id) {
                    push_unique(&mut duplicated, id);
                }
            }
        }

        if duplicated.is_empty() {
            Ok(CheckOutcome::pass(
                "'read_group_id_in_bam' uniqueness check status: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'read_group_id_in_bam' must be unique if populated in read_groups section, \
                 however duplicate(s) found: '{}'",
                duplicated.join(", ")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c220
// ---------------------------------------------------------------------------

/// `read_group_id_in_bam` is only populated for read groups backed by a BAM.
pub struct NoRgIdInBamForFq;

impl Checker for NoRgIdInBamForFq {
    fn name(&self) -> &'static str {
        "c220_no_rg_id_in_bam_for_fq"
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let read_groups = ctx.metadata().read_groups().unwrap_or_default();

        let mut offending = Vec::new();
        for rg in read_groups {
            let Some(id) = rg_id_in_bam(rg)? else {
                continue;
            };
            if !require_str(rg, "read_groups", "file_r1")?.ends_with(".bam") {
                offending.push(id);
            }
        }

        if offending.is_empty() {
            Ok(CheckOutcome::pass(
                "'read_group_id_in_bam' not populated for FASTQ check: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'read_group_id_in_bam' must NOT be populated in 'read_groups' section when it is \
                 not a BAM file: '{}'",
                offending.join("', '")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c240
// ---------------------------------------------------------------------------

/// A bare `submitter_read_group_id` must not collide with another read
/// group's `read_group_id_in_bam` in the same BAM.
pub struct SubmitterRgIdCollideWithRgIdInBam;

const C240_RULE: &str = "For any read group, when 'read_group_id_in_bam' is not populated, \
    'submitter_read_group_id' must NOT be the same as 'read_group_id_in_bam' of another read \
    group from the same BAM file.";

impl Checker for SubmitterRgIdCollideWithRgIdInBam {
    fn name(&self) -> &'static str {
        "c240_submitter_rg_id_collide_with_rg_id_in_bam"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c110_rg_id_uniqueness", "c200_rg_id_in_bam_uniqueness"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let mut bare_ids: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut ids_in_bam: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();

        for rg in ctx.metadata().require_read_groups()? {
            let file = require_str(rg, "read_groups", "file_r1")?;
            if !file.ends_with(".bam") {
                continue;
            }
            match rg_id_in_bam(rg)? {
                Some(id) => {
                    ids_in_bam.entry(file).or_default().insert(id);
                }
                None => {
                    let id = require_str(rg, "read_groups", "submitter_read_group_id")?;
                    bare_ids.entry(file).or_default().push(id);
                }
            }
        }

        let mut offending: BTreeSet<&str> = BTreeSet::new();
        for (file, ids) in &bare_ids {
            let Some(in_bam) = ids_in_bam.get(file) else {
                continue;
            };
            offending.extend(ids.iter().copied().filter(|id| in_bam.contains(id)));
        }

        if offending.is_empty() {
            Ok(CheckOutcome::pass(format!("{C240_RULE} Validation result: PASS")))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "{C240_RULE} However, offending submitter_read_group_id(s) found: {}",
                offending.into_iter().collect::<Vec<_>>().join(", ")
            )))
        }
    }
}
