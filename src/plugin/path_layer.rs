//! Logic relating to servicing path requests and sharing the results
//!

use crate::prelude::*;
use bevy::prelude::*;
use std::collections::BTreeMap;

/// A request to find a waypoint path between two world points. Results land
/// in the [PathCache] where any number of actors can read them
#[derive(Event)]
pub struct EventPathRequest {
	/// Where the path should start
	start: IVec3,
	/// Where the path should lead
	end: IVec3,
}

impl EventPathRequest {
	/// Create a new instance of [EventPathRequest]
	#[cfg(not(tarpaulin_include))]
	pub fn new(start: IVec3, end: IVec3) -> Self {
		EventPathRequest { start, end }
	}
}

/// Computed paths keyed on their requested endpoints. Unroutable requests are
/// cached as empty paths so repeated doomed requests stay cheap; the cache is
/// cleared whenever the mesh changes
#[derive(Component, Default)]
pub struct PathCache(BTreeMap<([i32; 3], [i32; 3]), Vec<IVec3>>);

impl PathCache {
	/// Get the cache of paths
	pub fn get(&self) -> &BTreeMap<([i32; 3], [i32; 3]), Vec<IVec3>> {
		&self.0
	}
	/// Get the cached path between two points, if any request for it has
	/// been serviced since the mesh last changed
	pub fn get_path(&self, start: IVec3, end: IVec3) -> Option<&Vec<IVec3>> {
		self.0.get(&(start.to_array(), end.to_array()))
	}
	/// Store the result of a path query
	pub fn insert(&mut self, start: IVec3, end: IVec3, path: Vec<IVec3>) {
		self.0.insert((start.to_array(), end.to_array()), path);
	}
	/// Drop every cached path
	pub fn clear(&mut self) {
		self.0.clear();
	}
}

/// Read [EventPathRequest] and record a path for each into the [PathCache].
/// Requests already answered since the last mesh change are skipped, so many
/// actors asking for the same route cost one search
#[cfg(not(tarpaulin_include))]
pub fn process_path_requests(
	mut events: EventReader<EventPathRequest>,
	mut query: Query<(&NavQuadMesh, &mut PathCache)>,
) {
	for event in events.read() {
		for (mesh, mut cache) in query.iter_mut() {
			if cache.get_path(event.start, event.end).is_some() {
				continue;
			}
			let path = mesh.find_path(event.start, event.end);
			debug!(
				"path request {:?} -> {:?} answered with {} waypoints",
				event.start,
				event.end,
				path.len()
			);
			cache.insert(event.start, event.end, path);
		}
	}
}
