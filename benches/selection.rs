//! Benchmarks for file selection and predicate evaluation.
//!
//! Selection walks every source tree once per build, and the library filter
//! runs on each directory and file it meets.

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use distpack::predicates::{include_in_lib, is_not_debug, EntryKind, LibraryFilter};
use distpack::select::select_all;
use tempfile::TempDir;

/// Creates a library-like tree: `packages` packages with `modules` modules
/// each, plus a test directory and a bytecode cache per package.
fn create_library(root: &Path, packages: usize, modules: usize) {
    for p in 0..packages {
        let package = root.join(format!("package{}", p));
        for dir in ["", "tests", "__pycache__"] {
            fs::create_dir_all(package.join(dir)).unwrap();
        }
        for m in 0..modules {
            fs::write(package.join(format!("module{}.py", m)), "x = 1\n").unwrap();
            fs::write(package.join(format!("tests/test_module{}.py", m)), "").unwrap();
            fs::write(package.join(format!("__pycache__/module{}.pyc", m)), "").unwrap();
        }
    }
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let filter = LibraryFilter::default();

    for packages in [10, 50] {
        let temp = TempDir::new().unwrap();
        create_library(temp.path(), packages, 20);

        group.bench_with_input(
            BenchmarkId::new("recursive_unfiltered", packages),
            temp.path(),
            |b, root| b.iter(|| select_all(black_box(root), "**/*", None).unwrap().len()),
        );
        group.bench_with_input(
            BenchmarkId::new("recursive_library", packages),
            temp.path(),
            |b, root| {
                b.iter(|| {
                    select_all(black_box(root), "**/*", Some(&filter))
                        .unwrap()
                        .len()
                })
            },
        );
    }

    group.finish();
}

fn bench_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicates");
    let names = [
        "python35.dll",
        "python35_d.dll",
        "_tkinter.pyd",
        "_testcapi.pyd",
        "_socket.pyd",
    ];

    group.bench_function("is_not_debug", |b| {
        b.iter(|| {
            names
                .iter()
                .filter(|n| is_not_debug(Path::new(black_box(n))))
                .count()
        })
    });

    group.bench_function("include_in_lib", |b| {
        let paths = [
            ("Lib/json/__init__.py", EntryKind::File),
            ("Lib/test", EntryKind::Directory),
            ("Lib/site-packages/six-1.10.0.dist-info", EntryKind::Directory),
            ("Lib/distutils/command/bdist_wininst.py", EntryKind::File),
        ];
        b.iter(|| {
            paths
                .iter()
                .filter(|(p, kind)| include_in_lib(Path::new(black_box(p)), *kind))
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_select, bench_predicates);
criterion_main!(benches);
