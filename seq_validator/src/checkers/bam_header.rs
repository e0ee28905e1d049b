//! BAM checkers: c608, c610, c620, c630, c640, c650, c660.
//!
//! All of these compare the `@RG` header lines of submitted BAM files with
//! the metadata. Headers come from [`crate::tools::SeqTools`].

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::bam::{bam_files, bam_read_groups, ReadGroupLine};
use crate::checkers::read_groups::{rg_id_in_bam, rg_id_regex};
use crate::checkers::{CheckError, CheckOutcome, Checker};
use crate::context::{require_str, str_field, ValidationContext};

/// `"BAM a.bam: x, y; BAM b.bam: z"`, files and ids sorted.
fn per_bam_list(by_bam: &BTreeMap<&str, BTreeSet<&str>>) -> String {
    by_bam
        .iter()
        .map(|(bam, ids)| {
            format!(
                "BAM {bam}: {}",
                ids.iter().copied().collect::<Vec<_>>().join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read groups backed by a BAM, with their `file_r1`.
fn bam_read_group_entries(ctx: &ValidationContext) -> Result<Vec<(&str, &Value)>, CheckError> {
    let mut entries = Vec::new();
    for rg in ctx.metadata().require_read_groups()? {
        let file = require_str(rg, "read_groups", "file_r1")?;
        if file.ends_with(".bam") {
            entries.push((file, rg));
        }
    }
    Ok(entries)
}

fn header_ids(lines: &[ReadGroupLine]) -> BTreeSet<&str> {
    lines.iter().filter_map(ReadGroupLine::id).collect()
}

// ---------------------------------------------------------------------------
// c608
// ---------------------------------------------------------------------------

/// Every BAM passes `samtools quickcheck`.
pub struct BamSanity;

impl Checker for BamSanity {
    fn name(&self) -> &'static str {
        "c608_bam_sanity"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c180_file_uniqueness", "c605_all_files_accessible"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let mut corrupted = BTreeMap::new();
        for bam in bam_files(ctx)? {
            if let Some(detail) = ctx.tools().quickcheck(&ctx.data_path(bam)?)? {
                corrupted.insert(bam, detail);
            }
        }

        if corrupted.is_empty() {
            return Ok(CheckOutcome::pass(
                "BAM sanity check by samtools quickcheck. Validation result: PASS",
            ));
        }

        let names: Vec<&str> = corrupted.keys().copied().collect();
        let details: Vec<&str> = corrupted.values().map(String::as_str).collect();
        log::info!(
            "[{}] samtools quickcheck output: {}",
            self.name(),
            details.join("; ")
        );

        let mut message = format!(
            "BAM file(s) samtools quickcheck failed: {}",
            names.join(", ")
        );
        if let Some(log_file) = ctx.log_file() {
            message.push_str(&format!(
                ". More information can be found in: {}",
                log_file.display()
            ));
        }
        Ok(CheckOutcome::invalid(message))
    }
}

// ---------------------------------------------------------------------------
// c610
// ---------------------------------------------------------------------------

/// Each BAM header declares read group ids that are unique and well-formed.
pub struct RgIdInBam;

impl Checker for RgIdInBam {
    fn name(&self) -> &'static str {
        "c610_rg_id_in_bam"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c605_all_files_accessible"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let headers = bam_read_groups(ctx)?;

        let mut offending: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (bam, lines) in &headers {
            if lines.is_empty() {
                return Ok(CheckOutcome::invalid(format!(
                    "No read group ID found in header for BAM: {bam}"
                )));
            }

            let mut seen = BTreeSet::new();
            let mut duplicated = BTreeSet::new();
            for line in lines {
                let Some(id) = line.id() else {
                    return Ok(CheckOutcome::invalid(format!(
                        "@RG line without ID found in header for BAM: {bam}"
                    )));
                };
                if !seen.insert(id) {
                    duplicated.insert(id);
                }
                if !rg_id_regex().is_match(id) {
                    offending.entry(bam.as_str()).or_default().insert(id);
                }
            }

            if !duplicated.is_empty() {
                return Ok(CheckOutcome::invalid(format!(
                    "Duplicated read group ID found: {} in BAM: {bam}",
                    duplicated.into_iter().collect::<Vec<_>>().join(", ")
                )));
            }
        }

        if offending.is_empty() {
            Ok(CheckOutcome::pass("Read group ID in BAM header check: PASS"))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "Read group ID in BAM header contains non-permissible character: {}",
                per_bam_list(&offending)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c620
// ---------------------------------------------------------------------------

/// BAM read groups without `read_group_id_in_bam` are found in the header
/// under their `submitter_read_group_id`.
pub struct SubmitterReadGroupIdMatch;

impl Checker for SubmitterReadGroupIdMatch {
    fn name(&self) -> &'static str {
        "c620_submitter_read_group_id_match"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c605_all_files_accessible"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let headers = bam_read_groups(ctx)?;

        let mut offending: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (file, rg) in bam_read_group_entries(ctx)? {
            if rg_id_in_bam(rg)?.is_some() {
                continue;
            }
            let id = require_str(rg, "read_groups", "submitter_read_group_id")?;
            let found = headers
                .get(file)
                .is_some_and(|lines| header_ids(lines).contains(id));
            if !found {
                offending.entry(file).or_default().insert(id);
            }
        }

        if offending.is_empty() {
            Ok(CheckOutcome::pass(
                "For each read group, when 'read_group_id_in_bam' is not provided, \
                 'submitter_read_group_id' in the metadata JSON must match RG ID in BAM. \
                 Validation result: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "For each read group, when 'read_group_id_in_bam' is not provided, \
                 'submitter_read_group_id' in the metadata JSON must match RG ID in the BAM file. \
                 Offending submitter_read_group_id(s): {}",
                per_bam_list(&offending)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c630
// ---------------------------------------------------------------------------

/// Populated `read_group_id_in_bam` values exist in the BAM header.
pub struct RgIdInBamMatch;

impl Checker for RgIdInBamMatch {
    fn name(&self) -> &'static str {
        "c630_rg_id_in_bam_match"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c605_all_files_accessible"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let headers = bam_read_groups(ctx)?;

        let mut offending: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (file, rg) in bam_read_group_entries(ctx)? {
            let Some(id) = rg_id_in_bam(rg)? else {
                continue;
            };
            let found = headers
                .get(file)
                .is_some_and(|lines| header_ids(lines).contains(id));
            if !found {
                offending.entry(file).or_default().insert(id);
            }
        }

        if offending.is_empty() {
            Ok(CheckOutcome::pass(
                "'read_group_id_in_bam' in metadata matches RG ID in BAM check: PASS",
            ))
        } else {
            Ok(CheckOutcome::invalid(format!(
                "'read_group_id_in_bam' specified in 'read_groups' section of the metadata not \
                 found in BAM file. Offending ID(s): {}",
                per_bam_list(&offending)
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// c640
// ---------------------------------------------------------------------------

/// All BAM headers carry one and the same `SM` value.
pub struct OneSmInBamHeader;

impl Checker for OneSmInBamHeader {
    fn name(&self) -> &'static str {
        "c640_one_sm_in_bam_header"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c605_all_files_accessible"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let headers = bam_read_groups(ctx)?;

        let sm_by_bam: BTreeMap<&str, BTreeSet<&str>> = headers
            .iter()
            .map(|(bam, lines)| {
                (
                    bam.as_str(),
                    lines.iter().filter_map(ReadGroupLine::sample).collect(),
                )
            })
            .collect();
        let all_sms: BTreeSet<&str> = sm_by_bam.values().flatten().copied().collect();

        if !sm_by_bam.is_empty() && all_sms.is_empty() {
            return Ok(CheckOutcome::invalid(format!(
                "No SM found in @RG BAM header, BAM(s): {}",
                sm_by_bam.keys().copied().collect::<Vec<_>>().join(", ")
            )));
        }

        let mut offending: BTreeMap<&str, &BTreeSet<&str>> = sm_by_bam
            .iter()
            .filter(|(_, sms)| sms.len() != 1)
            .map(|(bam, sms)| (*bam, sms))
            .collect();
        // Each BAM may be consistent on its own yet disagree with the others.
        if offending.is_empty() && all_sms.len() > 1 {
            offending = sm_by_bam.iter().map(|(bam, sms)| (*bam, sms)).collect();
        }

        if offending.is_empty() {
            return Ok(CheckOutcome::pass(
                "One and only one SM in @RG BAM header check: PASS",
            ));
        }

        let details: Vec<String> = offending
            .iter()
            .map(|(bam, sms)| {
                format!(
                    "BAM {bam}: '{}'",
                    sms.iter().copied().collect::<Vec<_>>().join("', '")
                )
            })
            .collect();
        Ok(CheckOutcome::invalid(format!(
            "SM in @RG headers of all BAM(s) must be populated with the same value. BAM(s) with \
             no SM or multiple SMs, or different SMs from different BAMs are found: {}",
            details.join("; ")
        )))
    }
}

// ---------------------------------------------------------------------------
// c650
// ---------------------------------------------------------------------------

/// The single `SM` in the BAM headers equals `samples[0].submitterSampleId`.
pub struct SmInBamMatchesMetadata;

impl Checker for SmInBamMatchesMetadata {
    fn name(&self) -> &'static str {
        "c650_sm_in_bam_matches_metadata"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["c605_all_files_accessible", "c640_one_sm_in_bam_header"]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let headers = bam_read_groups(ctx)?;
        let all_sms: BTreeSet<&str> = headers
            .values()
            .flatten()
            .filter_map(ReadGroupLine::sample)
            .collect();

        let sample = ctx
            .metadata()
            .samples()
            .and_then(|s| s.first())
            .ok_or_else(|| CheckError::MissingSection("samples".to_owned()))?;
        let Some(sample_id) = str_field(sample, "submitterSampleId") else {
            return Ok(CheckOutcome::invalid(
                "Required field 'submitterSampleId' not exists or not populated in the 'samples' \
                 section of the metadata JSON",
            ));
        };

        if headers.is_empty() {
            return Ok(CheckOutcome::pass("No BAM file submitted, SM check: PASS"));
        }

        let mut sms = all_sms.iter();
        match (sms.next(), sms.next()) {
            (Some(sm), None) if *sm == sample_id => Ok(CheckOutcome::pass(
                "SM in BAM header matches submitterSampleId in metadata JSON: PASS",
            )),
            (Some(sm), None) => Ok(CheckOutcome::invalid(format!(
                "SM in BAM header does not match submitterSampleId in metadata JSON: \
                 {sm} vs {sample_id}"
            ))),
            _ => Err(CheckError::Inconsistent(format!(
                "No SM or more than one SM found in BAM(s): '{}'",
                all_sms.iter().copied().collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// c660
// ---------------------------------------------------------------------------

/// Where the metadata counterpart of an `@RG` tag lives.
#[derive(Clone, Copy)]
enum Source {
    ReadGroup,
    Experiment,
}

/// `@RG` tags compared with metadata. `ID` and `SM` are validated elsewhere.
const FIELD_MAPPING: [(&str, Source, &str); 8] = [
    ("BC", Source::ReadGroup, "sample_barcode"),
    ("CN", Source::Experiment, "sequencing_center"),
    ("DT", Source::Experiment, "sequencing_date"),
    ("LB", Source::ReadGroup, "library_name"),
    ("PI", Source::ReadGroup, "insert_size"),
    ("PL", Source::Experiment, "platform"),
    ("PM", Source::Experiment, "platform_model"),
    ("PU", Source::ReadGroup, "platform_unit"),
];

/// Metadata value as header text; numbers compare by their decimal form.
fn as_header_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `@RG` header fields other than `ID`/`SM` agree with the metadata.
/// Disagreement is advisory: metadata values take precedence downstream.
pub struct MetadataInBamRgHeader;

impl Checker for MetadataInBamRgHeader {
    fn name(&self) -> &'static str {
        "c660_metadata_in_bam_rg_header"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &[
            "c110_rg_id_uniqueness",
            "c160_file_r1_r2_check",
            "c180_file_uniqueness",
            "c200_rg_id_in_bam_uniqueness",
            "c240_submitter_rg_id_collide_with_rg_id_in_bam",
            "c605_all_files_accessible",
            "c610_rg_id_in_bam",
            "c620_submitter_read_group_id_match",
        ]
    }

    fn check(&self, ctx: &ValidationContext) -> Result<CheckOutcome, CheckError> {
        let headers = bam_read_groups(ctx)?;
        let experiment = ctx.metadata().experiment();

        let mut mismatches: BTreeMap<&str, BTreeMap<&str, Vec<String>>> = BTreeMap::new();
        for (file, rg) in bam_read_group_entries(ctx)? {
            let rg_id = match rg_id_in_bam(rg)? {
                Some(id) if !id.is_empty() => id,
                _ => require_str(rg, "read_groups", "submitter_read_group_id")?,
            };
            let Some(line) = headers
                .get(file)
                .and_then(|lines| lines.iter().find(|l| l.id() == Some(rg_id)))
            else {
                continue;
            };

            for (tag, source, key) in FIELD_MAPPING {
                let Some(in_bam) = line.get(tag).filter(|v| !v.is_empty()) else {
                    continue;
                };
                let in_metadata = match source {
                    Source::ReadGroup => rg.get(key),
                    Source::Experiment => experiment.and_then(|e| e.get(key)),
                };
                let in_metadata = as_header_text(in_metadata);
                if in_metadata.as_deref() == Some(in_bam) {
                    log::debug!(
                        "[{}] BAM: {file}, RG: {rg_id}, field: {tag}, value: {in_bam} matches metadata",
                        self.name()
                    );
                } else {
                    mismatches
                        .entry(file)
                        .or_default()
                        .entry(rg_id)
                        .or_default()
                        .push(format!(
                            "{tag}: {in_bam} vs {}",
                            in_metadata.as_deref().unwrap_or("null")
                        ));
                }
            }
        }

        if mismatches.is_empty() {
            return Ok(CheckOutcome::pass(
                "Information (excluding ID and SM which are validated elsewhere) in BAM @RG \
                 header match experiment/read group info in metadata JSON: PASS",
            ));
        }

        let details: Vec<String> = mismatches
            .iter()
            .flat_map(|(file, by_rg)| {
                by_rg.iter().map(move |(rg_id, diffs)| {
                    format!("[BAM {file} @RG {rg_id}: ({})]", diffs.join(", "))
                })
            })
            .collect();
        Ok(CheckOutcome::warning(format!(
            "Information (excluding ID and SM which are validated elsewhere) in BAM @RG header \
             does NOT match experiment/read group info in metadata JSON. NOTE that information \
             in the metadata JSON document will be kept and used in ICGC ARGO uniform analysis \
             while unmatched info in BAM header will be lost. Details of the difference: {}",
            details.join("; ")
        )))
    }
}
