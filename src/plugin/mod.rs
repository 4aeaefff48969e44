//! Defines the Bevy [Plugin] for quad navigation meshes
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod build_layer;
pub mod path_layer;

/// Mesh mutation runs before pathfinding so path requests in the same frame
/// see the world they were issued against
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Rebuilds and collider changes
	Mutate,
	/// Path request servicing
	Pathfind,
}

/// Registers the navigation mesh types, events and systems
pub struct NavQuadPlugin;

impl Plugin for NavQuadPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<GridRect>()
			.register_type::<GridBox>()
			.register_type::<HeightField>()
			.register_type::<Quad>()
			.register_type::<NavQuadMesh>()
			.add_event::<build_layer::EventRebuildNavMesh>()
			.add_event::<build_layer::EventInsertCollider>()
			.add_event::<build_layer::EventRemoveColliders>()
			.add_event::<path_layer::EventPathRequest>()
			.configure_sets(Update, (OrderingSet::Mutate, OrderingSet::Pathfind).chain())
			.add_systems(
				Update,
				(
					(
						build_layer::process_mesh_rebuilds,
						build_layer::process_collider_events,
					)
						.chain()
						.in_set(OrderingSet::Mutate),
					path_layer::process_path_requests.in_set(OrderingSet::Pathfind),
				),
			);
	}
}
