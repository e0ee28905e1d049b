//! Criterion benchmarks for seq-validator.
//!
//! Measures a full validation run over synthetic paired-end FASTQ
//! submissions of varying sizes (10, 100, 500 read groups), with and
//! without a data directory.

use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

use seq_validator::engine::{ValidationEngine, ValidationInput};

const FASTQ_CONTENT: &[u8] = b"@read1\nACGT\n+\nFFFF\n";

fn synthetic_metadata(read_groups: usize) -> Value {
    let mut rgs = Vec::with_capacity(read_groups);
    let mut files = Vec::with_capacity(read_groups * 2);
    for i in 0..read_groups {
        let r1 = format!("sample_{i}_R1.fq.gz");
        let r2 = format!("sample_{i}_R2.fq.gz");
        rgs.push(json!({
            "submitter_read_group_id": format!("RG.{i}"),
            "platform_unit": format!("FLOWCELL.{i}"),
            "is_paired_end": true,
            "file_r1": r1,
            "file_r2": r2,
            "read_group_id_in_bam": null
        }));
        for name in [r1, r2] {
            files.push(json!({
                "fileName": name,
                "fileSize": FASTQ_CONTENT.len(),
                "dataType": "Submitted Reads",
                "info": {"data_category": "Sequencing Reads"}
            }));
        }
    }
    json!({
        "submitterId": "BENCH",
        "read_group_count": read_groups,
        "experiment": {"platform": "ILLUMINA"},
        "samples": [{"submitterSampleId": "SAMPLE-1"}],
        "read_groups": rgs,
        "files": files
    })
}

fn write_data_files(dir: &Path, metadata: &Value) {
    let files = metadata["files"].as_array().map(Vec::as_slice).unwrap_or_default();
    for file in files {
        if let Some(name) = file["fileName"].as_str() {
            std::fs::write(dir.join(name), FASTQ_CONTENT).unwrap();
        }
    }
}

fn bench_metadata_only(c: &mut Criterion) {
    let engine = ValidationEngine::default();
    let mut group = c.benchmark_group("metadata_only");
    for size in [10, 100, 500] {
        let metadata = synthetic_metadata(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &metadata, |b, md| {
            b.iter(|| engine.validate(ValidationInput::value(md.clone())))
        });
    }
    group.finish();
}

fn bench_with_data_dir(c: &mut Criterion) {
    let engine = ValidationEngine::default();
    let mut group = c.benchmark_group("with_data_dir");
    for size in [10, 100] {
        let metadata = synthetic_metadata(size);
        let dir = tempfile::tempdir().unwrap();
        write_data_files(dir.path(), &metadata);
        group.bench_with_input(BenchmarkId::from_parameter(size), &metadata, |b, md| {
            b.iter(|| {
                engine.validate(ValidationInput::value(md.clone()).with_data_dir(dir.path()))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_metadata_only, bench_with_data_dir);
criterion_main!(benches);
