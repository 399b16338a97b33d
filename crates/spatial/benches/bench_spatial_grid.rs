use std::hint::black_box;
use std::time::Instant;

use duskcast_common::EntityId;
use duskcast_spatial::SpatialGrid;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn make_entities(entity_count: usize, extent: f32, seed: u64) -> Vec<(EntityId, Vec2)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..entity_count)
        .map(|i| {
            let pos = Vec2::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent));
            (EntityId::from_raw(i as u128), pos)
        })
        .collect()
}

fn bench_rebuild(entity_count: usize, iterations: usize) {
    let entities = make_entities(entity_count, 200.0, 1);
    let mut grid = SpatialGrid::new(5.0);

    let start = Instant::now();
    for _ in 0..iterations {
        grid.rebuild(black_box(entities.iter().copied()));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  rebuild ({entity_count} entities, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_move(entity_count: usize, iterations: usize) {
    let mut entities = make_entities(entity_count, 200.0, 2);
    let mut grid = SpatialGrid::new(5.0);
    grid.rebuild(entities.iter().copied());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let start = Instant::now();
    for _ in 0..iterations {
        // One frame of small steps for every entity
        for (id, pos) in entities.iter_mut() {
            let next = *pos + Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
            grid.move_entity(*id, *pos, black_box(next));
            *pos = next;
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  move all ({entity_count} entities, {iterations} frames): {per_iter:?}/frame, total {elapsed:?}"
    );
}

fn bench_query_radius(entity_count: usize, radius: f32, iterations: usize) {
    let entities = make_entities(entity_count, 200.0, 4);
    let mut grid = SpatialGrid::new(5.0);
    grid.rebuild(entities.iter().copied());

    let center = Vec2::new(100.0, 100.0);
    let mut out = Vec::new();
    let start = Instant::now();
    for _ in 0..iterations {
        out.clear();
        grid.query_radius_into(black_box(center), black_box(radius), &mut out);
        black_box(&out);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  radius query ({entity_count} entities, r={radius}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_brute_force(entity_count: usize, radius: f32, iterations: usize) {
    let entities = make_entities(entity_count, 200.0, 4);
    let center = Vec2::new(100.0, 100.0);
    let r2 = radius * radius;

    let start = Instant::now();
    for _ in 0..iterations {
        let hits = entities
            .iter()
            .filter(|(_, p)| p.distance_squared(black_box(center)) <= r2)
            .count();
        black_box(hits);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  brute force ({entity_count} entities, r={radius}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_nearest(entity_count: usize, iterations: usize) {
    let entities = make_entities(entity_count, 200.0, 5);
    let mut grid = SpatialGrid::new(5.0);
    grid.rebuild(entities.iter().copied());
    let mut rng = ChaCha8Rng::seed_from_u64(6);

    let start = Instant::now();
    for _ in 0..iterations {
        let center = Vec2::new(rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0));
        let _ = black_box(grid.nearest(black_box(center)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  nearest ({entity_count} entities, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Spatial Grid Benchmarks ===\n");

    println!("Grid rebuild:");
    bench_rebuild(100, 1000);
    bench_rebuild(1000, 100);
    bench_rebuild(10000, 10);

    println!("\nIncremental move:");
    bench_move(100, 1000);
    bench_move(1000, 100);

    println!("\nRadius query vs brute force:");
    bench_query_radius(1000, 10.0, 10000);
    bench_brute_force(1000, 10.0, 10000);
    bench_query_radius(10000, 20.0, 1000);
    bench_brute_force(10000, 20.0, 1000);

    println!("\nNearest (ring search):");
    bench_nearest(1000, 10000);
    bench_nearest(10000, 1000);

    println!("\n=== Done ===");
}
