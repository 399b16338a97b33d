use std::hint::black_box;
use std::time::Instant;

use duskcast_common::{EngineConfig, Pose};
use duskcast_map::Map;
use duskcast_raycast::{RayCaster, column_angle};

fn make_map(size: usize) -> Map {
    let mut rows = vec![vec![0u16; size]; size];
    // Sparse pillars so rays travel a while before hitting something
    for y in (4..size - 1).step_by(7) {
        for x in (3..size - 1).step_by(5) {
            rows[y][x] = 1 + ((x + y) % 5) as u16;
        }
    }
    Map::from_material_grid(&rows).unwrap_or_else(|e| panic!("bench map: {e}"))
}

fn bench_scalar(map_size: usize, columns: usize, iterations: usize) {
    let map = make_map(map_size);
    let config = EngineConfig {
        max_depth: map_size as f32,
        ..EngineConfig::default()
    };
    let rc = RayCaster::new(&map, &config).unwrap_or_else(|e| panic!("caster: {e}"));
    let pose = Pose::new(1.5, map_size as f32 * 0.5, 0.2);

    let start = Instant::now();
    for _ in 0..iterations {
        for i in 0..columns {
            let rel = column_angle(i, config.fov, columns);
            black_box(rc.cast_column(black_box(&map), &pose, rel));
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  scalar ({map_size}x{map_size} map, {columns} columns, {iterations} frames): {per_iter:?}/frame, total {elapsed:?}"
    );
}

fn bench_batch(map_size: usize, columns: usize, iterations: usize) {
    let map = make_map(map_size);
    let config = EngineConfig {
        max_depth: map_size as f32,
        ..EngineConfig::default()
    };
    let mut rc = RayCaster::new(&map, &config).unwrap_or_else(|e| panic!("caster: {e}"));
    let pose = Pose::new(1.5, map_size as f32 * 0.5, 0.2);

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(rc.cast_all(black_box(&map), &pose, config.fov, columns));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  batch ({map_size}x{map_size} map, {columns} columns, {iterations} frames): {per_iter:?}/frame, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Ray Cast Benchmarks ===\n");

    println!("Per-column cast:");
    bench_scalar(32, 320, 1000);
    bench_scalar(128, 320, 200);
    bench_scalar(128, 1280, 50);

    println!("\nBatch cast:");
    bench_batch(32, 320, 1000);
    bench_batch(128, 320, 200);
    bench_batch(128, 1280, 50);

    println!("\n=== Done ===");
}
