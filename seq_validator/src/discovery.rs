//! Sequencing file discovery in a submission's data directory.
//!
//! Only the top level of the directory is listed. Regular files and
//! symlinks whose names end in a recognized sequencing suffix are kept,
//! sorted by name.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use walkdir::WalkDir;

/// Names recognized as submitted sequencing files.
pub const DATA_FILE_PATTERN: &str = r"^.+?\.(bam|fq\.gz|fastq\.gz|fq\.bz2|fastq\.bz2)$";

fn data_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DATA_FILE_PATTERN).expect("data file regex is valid"))
}

/// Whether a file name has a recognized sequencing suffix.
#[must_use]
pub fn is_data_file_name(name: &str) -> bool {
    data_file_regex().is_match(name)
}

/// List the sequencing files directly inside `dir`, sorted by name.
///
/// Unreadable entries and non-UTF-8 names are skipped with a warning. A
/// missing or unreadable directory yields an empty list.
#[must_use]
pub fn discover_data_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping entry in {}: {e}", dir.display());
                continue;
            }
        };

        let file_type = entry.file_type();
        if !(file_type.is_file() || file_type.is_symlink()) {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            log::warn!(
                "Skipping file {}: name is not valid UTF-8",
                entry.path().display()
            );
            continue;
        };

        if is_data_file_name(name) {
            files.push(name.to_owned());
        }
    }

    files
}
