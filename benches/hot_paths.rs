//! Performance benchmarks for blocksmith hot paths.
//!
//! Measures the work done before every generation call:
//! - Directory scanning with exclusion and extension filters
//! - Context assembly under different budgets
//!
//! Run with: `cargo bench`
//! View reports: `open target/criterion/report/index.html`

use blocksmith::services::{assemble, scan};
use blocksmith::types::{Extensions, FileRecord};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs;
use tempfile::TempDir;

/// Builds a blocks tree with `blocks` blocks, each holding a JS and CSS file
/// plus noise that the scanner must skip.
fn setup_blocks(blocks: usize) -> TempDir {
    let dir = TempDir::new().unwrap();

    for i in 0..blocks {
        let block = dir.path().join(format!("block-{i:04}"));
        fs::create_dir_all(&block).unwrap();
        fs::write(
            block.join(format!("block-{i:04}.js")),
            format!(
                "export default function decorate(block) {{\n  \
                 const wrapper = document.createElement('div');\n  \
                 wrapper.className = 'block-{i}-wrapper';\n  \
                 block.append(wrapper);\n}}\n"
            ),
        )
        .unwrap();
        fs::write(
            block.join(format!("block-{i:04}.css")),
            format!(".block-{i}-wrapper {{ display: flex; gap: 1rem; }}\n"),
        )
        .unwrap();
        fs::write(block.join("README.md"), "# notes\n").unwrap();
    }

    let deps = dir.path().join("node_modules/dep");
    fs::create_dir_all(&deps).unwrap();
    for i in 0..200 {
        fs::write(deps.join(format!("m{i}.js")), "module.exports = {};\n").unwrap();
    }

    dir
}

// ============================================================================
// Scanner Benchmarks
// ============================================================================

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let extensions = Extensions::default();

    for blocks in [10, 100, 500] {
        let dir = setup_blocks(blocks);
        group.throughput(Throughput::Elements(blocks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &dir, |b, dir| {
            b.iter(|| black_box(scan(dir.path(), &extensions).unwrap()))
        });
    }

    group.finish();
}

// ============================================================================
// Assembly Benchmarks
// ============================================================================

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");

    let records: Vec<FileRecord> = (0..1_000)
        .map(|i| FileRecord::new(format!("block-{i}/block-{i}.js"), "x".repeat(400)))
        .collect();

    for budget in [10_000, 50_000, 500_000] {
        group.bench_with_input(BenchmarkId::from_parameter(budget), &budget, |b, &budget| {
            b.iter(|| black_box(assemble(&records, budget)))
        });
    }

    group.finish();
}

fn bench_scan_and_assemble(c: &mut Criterion) {
    let dir = setup_blocks(100);
    let extensions = Extensions::default();

    c.bench_function("scan_and_assemble_100_blocks", |b| {
        b.iter(|| {
            let records = scan(dir.path(), &extensions).unwrap();
            black_box(assemble(&records, 50_000))
        })
    });
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(scan_benches, bench_scan, bench_scan_and_assemble);

criterion_group!(assemble_benches, bench_assemble);

criterion_main!(scan_benches, assemble_benches);
