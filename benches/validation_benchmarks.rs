use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use version_catalog_validator::{RuleSet, parse, validate_document};

/// Generate catalog content with specific validation scenarios
fn generate_validation_content(entries: usize, scenario: &str) -> String {
    let mut versions = String::from("[versions]\n");
    let mut libraries = String::from("[libraries]\n");
    let mut bundles = String::from("[bundles]\nall = [");

    for i in 0..entries {
        versions.push_str(&format!("v{} = \"2.{}.0\"\n", i, i % 10));

        let (module, reference) = match scenario {
            "bad_modules" if i % 3 == 0 => (format!("nocolon{}", i), format!("v{}", i)),
            "dangling_refs" if i % 4 == 0 => (format!("com.example:lib{}", i), format!("gone{}", i)),
            "vulnerable" if i % 5 == 0 => ("junit:junit".to_string(), "old".to_string()),
            _ => (format!("com.example:lib{}", i), format!("v{}", i)),
        };
        libraries.push_str(&format!(
            "lib{} = {{ module = \"{}\", version.ref = \"{}\" }}\n",
            i, module, reference
        ));
        bundles.push_str(&format!("\"lib{}\", ", i));
    }

    if scenario == "vulnerable" {
        versions.push_str("old = \"4.11\"\n");
    }
    bundles.push_str("]\n");

    format!("{versions}\n{libraries}\n{bundles}")
}

/// Benchmark validation with different error densities
fn bench_validation_error_density(c: &mut Criterion) {
    let rules = RuleSet::with_defaults();
    let scenarios = ["all_valid", "bad_modules", "dangling_refs", "vulnerable"];

    let mut group = c.benchmark_group("validation_error_density");

    for scenario in scenarios {
        let document = parse(&generate_validation_content(500, scenario)).expect("valid syntax");

        group.throughput(Throughput::Elements(document.entry_count() as u64));
        group.bench_with_input(
            BenchmarkId::new("scenario", scenario),
            &document,
            |b, document| {
                b.iter(|| black_box(validate_document(black_box(document), black_box(&rules))))
            },
        );
    }

    group.finish();
}

/// Benchmark validation scalability with catalog size
fn bench_validation_scalability(c: &mut Criterion) {
    let rules = RuleSet::with_defaults();

    let mut group = c.benchmark_group("validation_scalability");

    for &size in &[10, 100, 500, 2_000] {
        let document = parse(&generate_validation_content(size, "all_valid")).expect("valid syntax");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("entries", size), &document, |b, document| {
            b.iter(|| black_box(validate_document(black_box(document), black_box(&rules))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_validation_error_density,
    bench_validation_scalability
);
criterion_main!(benches);
