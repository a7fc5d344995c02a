//! Criterion benchmarks for key code translation.
//!
//! Binding a hotkey performs one `KeyCode → RawKeyCode` lookup; the Windows
//! keyboard device performs a `VK → RawKeyCode` lookup for every VK it polls,
//! every poll interval.  Both are linear scans over a ~120-entry table.
//!
//! Run with:
//! ```bash
//! cargo bench --package bounds-core --bench keymap_bench
//! ```

use bounds_core::keymap::{KeyCode, KeyMapper, RawKeyCode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ── Benchmarks: KeyCode → raw ─────────────────────────────────────────────────

fn bench_to_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_to_raw");

    // Best case (first table entry), typical hotkey, and a late entry.
    for key in [KeyCode::Escape, KeyCode::F6, KeyCode::F24] {
        group.bench_with_input(BenchmarkId::new("to_raw", key), &key, |b, &key| {
            b.iter(|| KeyMapper::to_raw(black_box(key)))
        });
    }

    group.bench_function("parse_then_to_raw", |b| {
        b.iter(|| {
            black_box("ScrollLock")
                .parse::<KeyCode>()
                .map(KeyMapper::to_raw_lossy)
        })
    });

    group.finish();
}

// ── Benchmarks: raw → KeyCode and VK → raw ────────────────────────────────────

fn bench_reverse_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_reverse");

    group.bench_function("from_raw_f24", |b| {
        b.iter(|| KeyMapper::from_raw(black_box(RawKeyCode(194))))
    });

    // One full Windows poll: every VK code once.
    group.bench_function("windows_vk_to_raw_all_256", |b| {
        b.iter(|| {
            (0u8..=255)
                .filter_map(|vk| KeyMapper::windows_vk_to_raw(black_box(vk)))
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_to_raw, bench_reverse_lookups);
criterion_main!(benches);
