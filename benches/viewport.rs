//! Benchmarks for viewport recomputation and dirty tracking.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gridframe::layout::{FnMetrics, SheetLayout, Viewport, ViewportConfig};
use gridframe::render::DirtyTracker;
use gridframe::types::CellRange;

fn uniform(rows: u32, cols: u32) -> FnMetrics {
    FnMetrics::new(|_| 25.0, |_| 100.0, move || rows, move || cols)
}

/// Recompute the range at increasing scroll depths (linear position scan)
fn bench_range_by_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport_range_depth");

    for depth in [0u32, 1_000, 10_000, 100_000] {
        let mut viewport = Viewport::new(ViewportConfig::default(), uniform(200_000, 50));
        viewport.set_view_size(1920.0, 1080.0);
        let y = f64::from(depth) * 25.0;

        group.bench_with_input(BenchmarkId::new("rows", depth), &y, |b, &y| {
            b.iter(|| {
                viewport.set_scroll(0.0, black_box(y));
                viewport.invalidate();
                black_box(viewport.range())
            })
        });
    }

    group.finish();
}

/// Same depths over prefix-sum metrics (binary search)
fn bench_range_by_depth_indexed(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport_range_depth_indexed");

    for depth in [0u32, 1_000, 10_000, 100_000] {
        let mut viewport = Viewport::new(
            ViewportConfig::default(),
            SheetLayout::uniform(200_000, 50, 25.0, 100.0),
        );
        viewport.set_view_size(1920.0, 1080.0);
        let y = f64::from(depth) * 25.0;

        group.bench_with_input(BenchmarkId::new("rows", depth), &y, |b, &y| {
            b.iter(|| {
                viewport.set_scroll(0.0, black_box(y));
                viewport.invalidate();
                black_box(viewport.range())
            })
        });
    }

    group.finish();
}

/// Cached reads after an unchanged input
fn bench_range_cached(c: &mut Criterion) {
    let mut viewport = Viewport::new(ViewportConfig::default(), uniform(100_000, 26));
    viewport.set_view_size(1920.0, 1080.0);
    viewport.set_scroll(0.0, 50_000.0);

    c.bench_function("viewport_range_cached", |b| {
        b.iter(|| {
            viewport.set_scroll(0.0, black_box(50_000.0));
            black_box(viewport.range())
        })
    });
}

/// Visit every realized cell of a full-HD viewport
fn bench_each_visible_cell(c: &mut Criterion) {
    let mut viewport = Viewport::new(
        ViewportConfig::default(),
        SheetLayout::uniform(100_000, 100, 20.0, 64.0),
    );
    viewport.set_view_size(1920.0, 1080.0);
    let range = viewport.range();
    let cells = u64::from(range.eri - range.sri + 1) * u64::from(range.eci - range.sci + 1);

    let mut group = c.benchmark_group("each_visible_cell");
    group.throughput(Throughput::Elements(cells));
    group.bench_function("full_hd", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            viewport.each_visible_cell(|cell| sum += cell.width);
            black_box(sum)
        })
    });
    group.finish();
}

/// Mark scattered cells up to the escalation threshold, then clear
fn bench_dirty_marking(c: &mut Criterion) {
    c.bench_function("dirty_mark_50_cells", |b| {
        b.iter(|| {
            let mut tracker = DirtyTracker::new();
            for i in 0..50 {
                tracker.mark_range(black_box(CellRange::cell(i * 3, i * 3)));
            }
            black_box(tracker.is_cell_dirty(75, 75))
        })
    });
}

criterion_group!(
    benches,
    bench_range_by_depth,
    bench_range_by_depth_indexed,
    bench_range_cached,
    bench_each_visible_cell,
    bench_dirty_marking
);
criterion_main!(benches);
