//! Convenience bundle spawning everything one navigable level needs
//!

use crate::prelude::*;
use bevy::prelude::*;

/// All the components an entity needs to carry a navigable level: the
/// [HeightField] derived from its geometry, the [NavQuadMesh] built over it
/// and the [PathCache] sharing query results between actors
#[derive(Bundle)]
pub struct NavQuadBundle {
	/// Per-cell vertical level data
	height_field: HeightField,
	/// The quad graph built from the height field
	mesh: NavQuadMesh,
	/// Computed paths shared between actors
	path_cache: PathCache,
}

impl NavQuadBundle {
	/// Create a new instance of [NavQuadBundle] covering `size` cells for
	/// agents with a square footprint of `agent_size` cells. The contained
	/// field and mesh are empty until an
	/// [crate::plugin::build_layer::EventRebuildNavMesh] supplies geometry
	pub fn new(size: IVec2, agent_size: i32) -> Self {
		NavQuadBundle {
			height_field: HeightField::new(size),
			mesh: NavQuadMesh::new(size, agent_size),
			path_cache: PathCache::default(),
		}
	}
}
