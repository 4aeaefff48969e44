//! Measure building a navigation mesh from scratch
//!
//! World is a 128x128 ground slab cluttered with pillars and a raised
//! platform reachable over a ramp of shallow steps
//!

use bevy_navquad_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bevy::math::{IVec2, IVec3};

/// Create the box geometry of the benchmark level
fn prepare_boxes() -> (Vec<GridBox>, Vec<GridBox>) {
	let mut walkable = vec![GridBox::new(IVec3::ZERO, IVec3::new(128, 1, 128))];
	// platform in the north east corner
	walkable.push(GridBox::new(IVec3::new(96, 7, 0), IVec3::new(128, 8, 32)));
	// steps up to it
	for n in 0..7 {
		walkable.push(GridBox::new(
			IVec3::new(96 - (n + 1) * 4, 6 - n, 8),
			IVec3::new(96 - n * 4, 7 - n, 24),
		));
	}
	// a grid of pillars across the ground floor
	let mut blockers = Vec::new();
	for pz in 0..6 {
		for px in 0..6 {
			let origin = IVec2::new(10 + px * 18, 42 + pz * 14);
			blockers.push(GridBox::new(
				IVec3::new(origin.x, 0, origin.y),
				IVec3::new(origin.x + 3, 6, origin.y + 3),
			));
		}
	}
	(walkable, blockers)
}

/// Derive the height field and build the quad mesh over it
fn build(walkable: Vec<GridBox>, blockers: Vec<GridBox>) -> NavQuadMesh {
	let size = IVec2::new(128, 128);
	let mut field = HeightField::new(size);
	field.update(&walkable, &blockers);
	let mut mesh = NavQuadMesh::new(size, 2);
	mesh.build(&field);
	mesh
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let (walkable, blockers) = prepare_boxes();
	group.bench_function("build_mesh", |b| {
		b.iter(|| build(black_box(walkable.clone()), black_box(blockers.clone())))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
