//! Drive the whole pipeline: boxes to height field to quad mesh, then path
//! queries across floors and around a collider
//!

use bevy::math::{IVec2, IVec3};
use bevy_navquad_plugin::prelude::*;

/// Total octile length of a waypoint path projected on the ground plane
fn path_length(path: &[IVec3]) -> f32 {
	path.windows(2)
		.map(|pair| octile_distance(as_xz(pair[0]), as_xz(pair[1])))
		.sum()
}

#[test]
fn two_floor_level_with_collider() {
	// a 32x32 ground floor, a raised platform along the east edge reached by
	// a two-step ramp, and a pillar in the middle of the ground floor
	//
	//  ________________ ____
	// |                | pl |
	// |      ##        | at |
	// |      ##   ramp | fo |
	// |________________|_rm_|
	//
	let size = IVec2::new(32, 32);
	let walkable = vec![
		GridBox::new(IVec3::new(0, 0, 0), IVec3::new(24, 1, 32)),
		GridBox::new(IVec3::new(24, 0, 0), IVec3::new(28, 2, 32)),
		GridBox::new(IVec3::new(28, 2, 0), IVec3::new(32, 3, 32)),
	];
	let blockers = vec![GridBox::new(IVec3::new(10, 0, 12), IVec3::new(14, 6, 18))];

	let mut field = HeightField::new(size);
	field.update(&walkable, &blockers);
	assert_eq!(field.level_count(), 1);

	let mut mesh = NavQuadMesh::new(size, 1);
	mesh.build(&field);
	let as_built = mesh.quads().to_vec();
	assert!(mesh.static_quad_count() >= 4);

	// ground floor to the top of the platform, over the ramp
	let start = IVec3::new(2, 1, 16);
	let end = IVec3::new(30, 3, 16);
	let over_ramp = mesh.find_path(start, end);
	assert!(!over_ramp.is_empty());
	assert_eq!(over_ramp[0], start);
	assert_eq!(over_ramp[over_ramp.len() - 1], end);
	// the route climbs through every height band
	for height in 1..=3 {
		assert!(over_ramp.iter().any(|p| p.y == height));
	}
	// and never crosses the pillar
	let pillar = GridRect::new(IVec2::new(10, 12), IVec2::new(14, 18));
	for waypoint in over_ramp.iter() {
		assert!(!pillar.contains(as_xz(*waypoint)));
	}

	// block the ramp with a door-sized collider
	mesh.add_collider(GridBox::new(IVec3::new(24, 0, 0), IVec3::new(28, 6, 32)));
	assert!(mesh.find_path(start, end).is_empty());
	// ground floor routing still works around the collider
	let ground = mesh.find_path(start, IVec3::new(20, 1, 16));
	assert!(!ground.is_empty());

	// reopening the door restores the exact as-built mesh and the route
	mesh.remove_colliders();
	assert_eq!(mesh.quads(), &as_built[..]);
	let reopened = mesh.find_path(start, end);
	assert!((path_length(&reopened) - path_length(&over_ramp)).abs() < 1e-3);

	// a rebuild from the same geometry reproduces the same mesh
	field.update(&walkable, &blockers);
	mesh.build(&field);
	assert_eq!(mesh.quads(), &as_built[..]);
}
