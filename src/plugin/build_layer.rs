//! Logic for handling changes to the walkable geometry which in turn rebuilds
//! the [HeightField] and [NavQuadMesh] and invalidates cached paths made
//! stale by the change
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Used to replace the box geometry of the level and rebuild every mesh
/// from it
#[derive(Event)]
pub struct EventRebuildNavMesh {
	/// Boxes whose top faces can be stood on
	walkable: Vec<GridBox>,
	/// Boxes that forbid standing where they cover walkable surfaces
	blockers: Vec<GridBox>,
}

impl EventRebuildNavMesh {
	/// Create a new instance of [EventRebuildNavMesh]
	#[cfg(not(tarpaulin_include))]
	pub fn new(walkable: Vec<GridBox>, blockers: Vec<GridBox>) -> Self {
		EventRebuildNavMesh { walkable, blockers }
	}
	#[cfg(not(tarpaulin_include))]
	/// Get the walkable boxes
	pub fn get_walkable(&self) -> &[GridBox] {
		&self.walkable
	}
	#[cfg(not(tarpaulin_include))]
	/// Get the blocker boxes
	pub fn get_blockers(&self) -> &[GridBox] {
		&self.blockers
	}
}

/// Used to carve a temporary obstacle into every mesh
#[derive(Event)]
pub struct EventInsertCollider(GridBox);

impl EventInsertCollider {
	/// Create a new instance of [EventInsertCollider]
	#[cfg(not(tarpaulin_include))]
	pub fn new(collider: GridBox) -> Self {
		EventInsertCollider(collider)
	}
	#[cfg(not(tarpaulin_include))]
	/// Get the collider box
	pub fn get(&self) -> GridBox {
		self.0
	}
}

/// Used to restore every mesh to its as-built state, removing all colliders
/// at once
#[derive(Event, Default)]
pub struct EventRemoveColliders;

/// Read [EventRebuildNavMesh] and rebuild the [HeightField] and
/// [NavQuadMesh] of every navigation bundle
#[cfg(not(tarpaulin_include))]
pub fn process_mesh_rebuilds(
	mut events: EventReader<EventRebuildNavMesh>,
	mut query: Query<(&mut HeightField, &mut NavQuadMesh, &mut PathCache)>,
) {
	for event in events.read() {
		for (mut field, mut mesh, mut cache) in query.iter_mut() {
			field.update(event.get_walkable(), event.get_blockers());
			mesh.build(&field);
			cache.clear();
		}
	}
}

/// Read [EventInsertCollider] and [EventRemoveColliders] and apply them to
/// every mesh. Removal restores the as-built mesh wholesale, so a single
/// removal event cancels every inserted collider
#[cfg(not(tarpaulin_include))]
pub fn process_collider_events(
	mut insertions: EventReader<EventInsertCollider>,
	mut removals: EventReader<EventRemoveColliders>,
	mut query: Query<(&mut NavQuadMesh, &mut PathCache)>,
) {
	for event in insertions.read() {
		for (mut mesh, mut cache) in query.iter_mut() {
			mesh.add_collider(event.get());
			cache.clear();
		}
	}
	if !removals.is_empty() {
		removals.clear();
		for (mut mesh, mut cache) in query.iter_mut() {
			debug!("restoring mesh to its as-built state");
			mesh.remove_colliders();
			cache.clear();
		}
	}
}
