//! Measure a refined path query across a cluttered level with an actor in
//! the south west corner pathing to the north east, plus the cost of a
//! collider insert/restore cycle
//!

use bevy_navquad_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bevy::math::{IVec2, IVec3};

/// Build the mesh the queries run against
fn prepare_mesh() -> NavQuadMesh {
	let size = IVec2::new(128, 128);
	let walkable = vec![GridBox::new(IVec3::ZERO, IVec3::new(128, 1, 128))];
	// staggered walls forcing long detours
	let mut blockers = Vec::new();
	for n in 0..5 {
		let x = 20 + n * 20;
		let (z_min, z_max) = if n % 2 == 0 { (0, 100) } else { (28, 128) };
		blockers.push(GridBox::new(
			IVec3::new(x, 0, z_min),
			IVec3::new(x + 2, 6, z_max),
		));
	}
	let mut field = HeightField::new(size);
	field.update(&walkable, &blockers);
	let mut mesh = NavQuadMesh::new(size, 1);
	mesh.build(&field);
	mesh
}

/// Path corner to corner through the maze
fn calc(mesh: &NavQuadMesh) -> Vec<IVec3> {
	mesh.find_path(IVec3::new(2, 1, 125), IVec3::new(125, 1, 2))
}

/// Split the mesh around a collider, path past it, then restore
fn calc_with_collider(mesh: &mut NavQuadMesh) -> Vec<IVec3> {
	mesh.add_collider(GridBox::new(IVec3::new(8, 0, 60), IVec3::new(14, 6, 68)));
	let path = mesh.find_path(IVec3::new(2, 1, 125), IVec3::new(125, 1, 2));
	mesh.remove_colliders();
	path
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let mut mesh = prepare_mesh();
	group.bench_function("calc_path", |b| b.iter(|| calc(black_box(&mesh))));
	group.bench_function("calc_path_with_collider", |b| {
		b.iter(|| calc_with_collider(black_box(&mut mesh)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
