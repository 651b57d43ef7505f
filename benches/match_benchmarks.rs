use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dupematch::matching::builder::{dual_root_matches, single_root_matches};
use dupematch::matching::{FingerprintIndex, MatchBuilder};
use dupematch::scanner::{FileCandidate, Fingerprint, Hasher, WalkOptions, Walker};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to create a directory of files, every `dup_every`-th sharing content
fn setup_test_dir(count: usize, dup_every: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..count {
        let content = if i % dup_every == 0 {
            "shared content block".to_string()
        } else {
            format!("unique content {i}")
        };
        fs::write(temp_dir.path().join(format!("file_{i}.txt")), content)
            .expect("Failed to write file");
    }
    temp_dir
}

fn synthetic_index(buckets: usize, members_per_bucket: usize) -> FingerprintIndex {
    let mut index = FingerprintIndex::new();
    for b in 0..buckets {
        let mut fingerprint: Fingerprint = [0; 32];
        fingerprint[..8].copy_from_slice(&(b as u64).to_le_bytes());
        for m in 0..members_per_bucket {
            index.insert(
                FileCandidate::new(PathBuf::from(format!("/bench/b{b}/f{m}.bin")), 100),
                fingerprint,
            );
        }
    }
    index
}

// 1. Walking
fn bench_walker(c: &mut Criterion) {
    let temp_dir = setup_test_dir(200, 5);

    c.bench_function("walker_200_files", |b| {
        b.iter(|| {
            let walker = Walker::new(temp_dir.path(), WalkOptions::default());
            let files: Vec<_> = walker.walk().collect();
            black_box(files);
        })
    });
}

// 2. Fingerprinting
fn bench_hasher(c: &mut Criterion) {
    let mut group = c.benchmark_group("hasher");
    let hasher = Hasher::new();

    for size_kb in [1, 64, 1024] {
        let data = vec![b'a'; size_kb * 1024];
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bench_file.dat");
        fs::write(&file_path, &data).expect("Failed to write bench file");

        group.bench_with_input(format!("blake3_{}KB", size_kb), &file_path, |b, path| {
            b.iter(|| {
                let fingerprint = hasher.hash_file(path).unwrap();
                black_box(fingerprint);
            });
        });
    }
    group.finish();
}

// 3. Match emission over a prebuilt index
fn bench_match_emission(c: &mut Criterion) {
    let index = synthetic_index(1000, 3);

    c.bench_function("single_root_matches_1000_buckets", |b| {
        b.iter(|| black_box(single_root_matches(&index)))
    });

    let sequence: Vec<(FileCandidate, Fingerprint)> = (0..1000)
        .map(|i| {
            let mut fingerprint: Fingerprint = [0; 32];
            fingerprint[..8].copy_from_slice(&(i as u64).to_le_bytes());
            (
                FileCandidate::new(PathBuf::from(format!("/bench/seq/f{i}.bin")), 100),
                fingerprint,
            )
        })
        .collect();

    c.bench_function("dual_root_matches_1000_probes", |b| {
        b.iter(|| black_box(dual_root_matches(&sequence, &index)))
    });
}

// 4. End-to-end single-root build
fn bench_full_build(c: &mut Criterion) {
    let temp_dir = setup_test_dir(200, 4);

    c.bench_function("build_single_root_200_files", |b| {
        b.iter(|| {
            let outcome = MatchBuilder::new(WalkOptions::default())
                .build_single_root(temp_dir.path())
                .unwrap();
            black_box(outcome);
        })
    });
}

criterion_group!(
    benches,
    bench_walker,
    bench_hasher,
    bench_match_emission,
    bench_full_build
);
criterion_main!(benches);
