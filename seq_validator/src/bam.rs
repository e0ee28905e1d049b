//! BAM `@RG` header parsing.
//!
//! Only the header text is interpreted here; retrieving it is the job of
//! [`crate::tools::SeqTools`].

use std::collections::BTreeMap;

use crate::checkers::CheckError;
use crate::context::{require_str, ValidationContext};

/// One `@RG` line of a SAM header, tags in the order they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadGroupLine {
    tags: Vec<(String, String)>,
}

impl ReadGroupLine {
    /// Value of the first occurrence of a two-letter tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == tag)
            .map(|(_, v)| v.as_str())
    }

    /// The `ID` tag.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("ID")
    }

    /// The `SM` tag.
    #[must_use]
    pub fn sample(&self) -> Option<&str> {
        self.get("SM")
    }
}

/// Extract every `@RG` line from SAM header text.
///
/// Tag values keep any further colons (`ID:run:1` has id `run:1`); fields
/// without a colon, such as the leading `@RG`, are dropped.
#[must_use]
pub fn parse_read_groups(header: &str) -> Vec<ReadGroupLine> {
    header
        .lines()
        .filter(|line| line.starts_with("@RG"))
        .map(|line| {
            let tags = line
                .trim_end()
                .split('\t')
                .filter_map(|field| {
                    field
                        .split_once(':')
                        .map(|(k, v)| (k.to_owned(), v.to_owned()))
                })
                .collect();
            ReadGroupLine { tags }
        })
        .collect()
}

/// BAM file names listed in the metadata `files` section, in listed order.
pub fn bam_files(ctx: &ValidationContext) -> Result<Vec<&str>, CheckError> {
    let mut bams = Vec::new();
    for file in ctx.metadata().require_files()? {
        let name = require_str(file, "files", "fileName")?;
        if name.ends_with(".bam") {
            bams.push(name);
        }
    }
    Ok(bams)
}

/// Read the `@RG` lines of every BAM listed in the metadata.
///
/// Keyed by file name as it appears in the metadata.
pub fn bam_read_groups(
    ctx: &ValidationContext,
) -> Result<BTreeMap<String, Vec<ReadGroupLine>>, CheckError> {
    let mut by_bam = BTreeMap::new();
    for bam in bam_files(ctx)? {
        let header = ctx.tools().view_header(&ctx.data_path(bam)?)?;
        by_bam.insert(bam.to_owned(), parse_read_groups(&header));
    }
    Ok(by_bam)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "@HD\tVN:1.6\tSO:coordinate\n\
        @SQ\tSN:chr1\tLN:248956422\n\
        @RG\tID:C0HVY.2\tSM:HCC1143\tLB:lib1\tPL:ILLUMINA\n\
        @RG\tID:run:7\tSM:HCC1143\tPU:unit\n\
        @PG\tID:bwa\tPN:bwa\n";

    #[test]
    fn test_parse_read_groups() {
        let rgs = parse_read_groups(HEADER);
        assert_eq!(rgs.len(), 2);
        assert_eq!(rgs[0].id(), Some("C0HVY.2"));
        assert_eq!(rgs[0].sample(), Some("HCC1143"));
        assert_eq!(rgs[0].get("PL"), Some("ILLUMINA"));
        assert_eq!(rgs[1].get("LB"), None);
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let rgs = parse_read_groups(HEADER);
        assert_eq!(rgs[1].id(), Some("run:7"));
    }

    #[test]
    fn test_no_read_groups() {
        assert!(parse_read_groups("@HD\tVN:1.6\n@SQ\tSN:1\tLN:5\n").is_empty());
        assert!(parse_read_groups("").is_empty());
    }

    #[test]
    fn test_missing_sm_tag() {
        let rgs = parse_read_groups("@RG\tID:x\n");
        assert_eq!(rgs[0].id(), Some("x"));
        assert_eq!(rgs[0].sample(), None);
    }
}
