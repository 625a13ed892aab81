use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use officesim_logic::grid::GridPos;
use officesim_logic::layout::{default_layout, Layout, TileKind};
use officesim_logic::pathfinding::find_path;
use officesim_logic::seats::SeatRegistry;
use officesim_logic::tilemap::{blocked_tiles, TileMap};

fn bench_default_office(c: &mut Criterion) {
    let layout = default_layout();
    let map = TileMap::from_layout(&layout);
    let blocked = blocked_tiles(&layout);
    let start = GridPos::new(1, 1);
    let end = GridPos::new(17, 8);

    c.bench_function("find_path default office corner to corner", |b| {
        b.iter(|| find_path(black_box(start), black_box(end), &map, &blocked))
    });

    c.bench_function("rebuild seats default office", |b| {
        b.iter(|| SeatRegistry::from_layout(black_box(&layout), &map, &blocked))
    });
}

fn bench_max_grid(c: &mut Criterion) {
    let layout = Layout::filled(64, 64, TileKind::Carpet);
    let map = TileMap::from_layout(&layout);
    let blocked = HashSet::new();

    c.bench_function("find_path 64x64 open floor", |b| {
        b.iter(|| {
            find_path(
                black_box(GridPos::new(0, 0)),
                black_box(GridPos::new(63, 63)),
                &map,
                &blocked,
            )
        })
    });
}

criterion_group!(benches, bench_default_office, bench_max_grid);
criterion_main!(benches);
