//! Criterion benchmarks for catalog formatting.
//!
//! The help command formats the whole catalog on every request, so HTML and
//! text generation should stay far below the renderer's settle delay even for
//! large menus.
//!
//! Run with:
//! ```bash
//! cargo bench --package menu-core --bench format_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use menu_core::{format_catalog_html, format_catalog_text, Category, CommandEntry};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Builds `categories` categories with `per_category` commands each.
fn build_catalog(categories: usize, per_category: usize) -> Vec<Category> {
    (0..categories)
        .map(|c| {
            let commands = (0..per_category)
                .map(|i| {
                    let desc = if i % 3 == 0 { String::new() } else { format!("Command {i} of category {c}") };
                    CommandEntry::new(format!("cmd{c}_{i}"), desc)
                })
                .collect();
            Category::new(format!("Category {c}"), commands)
        })
        .collect()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_catalog_html(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_catalog_html");

    for &(categories, per_category) in &[(1, 5), (10, 10), (50, 20)] {
        let catalog = build_catalog(categories, per_category);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{categories}x{per_category}")),
            &catalog,
            |b, catalog| b.iter(|| format_catalog_html(black_box(catalog))),
        );
    }

    group.finish();
}

fn bench_catalog_text(c: &mut Criterion) {
    let catalog = build_catalog(10, 10);
    c.bench_function("format_catalog_text_10x10", |b| {
        b.iter(|| {
            format_catalog_text(
                black_box(&catalog),
                "http://127.0.0.1:8081",
                "Images are unavailable.",
            )
        })
    });
}

criterion_group!(benches, bench_catalog_html, bench_catalog_text);
criterion_main!(benches);
