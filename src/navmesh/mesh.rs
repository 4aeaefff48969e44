//! The [NavQuadMesh] owns the quad arena and its adjacency graph, built from
//! a [HeightField] and locally subdivided when temporary colliders come and
//! go.
//!
//! Quads are stored in a single `Vec` and refer to each other by index. The
//! quads produced by [NavQuadMesh::build] are "static" and survive for the
//! lifetime of the mesh; colliders disable overlapped quads and append
//! "dynamic" residual quads after them, and [NavQuadMesh::remove_colliders]
//! undoes all of that by truncating the arena back to the static prefix.
//!

use crate::prelude::*;
use bevy::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

/// Group id of a quad not yet assigned by [NavQuadMesh::update_reachability]
const UNGROUPED: i32 = -1;

/// One rectangular walkable region of the mesh at a height band
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, PartialEq, Eq, Debug, Reflect)]
pub struct Quad {
	/// Ground footprint of the region
	rect: GridRect,
	/// Lowest walkable height across the region
	min_height: i32,
	/// Highest walkable height across the region
	max_height: i32,
	/// Indices of quads reachable in one step, static entries first
	neighbours: Vec<usize>,
	/// Length of the neighbour prefix created by [NavQuadMesh::build]
	static_ncount: usize,
	/// Disabled quads are skipped by lookup and search but keep their slot so
	/// indices stay stable
	is_disabled: bool,
}

impl Quad {
	/// Ground footprint of the region
	pub fn rect(&self) -> &GridRect {
		&self.rect
	}
	/// Lowest walkable height across the region
	pub fn min_height(&self) -> i32 {
		self.min_height
	}
	/// Highest walkable height across the region
	pub fn max_height(&self) -> i32 {
		self.max_height
	}
	/// Indices of quads reachable in one step
	pub fn neighbours(&self) -> &[usize] {
		&self.neighbours
	}
	/// Whether the quad has been disabled by a collider
	pub fn is_disabled(&self) -> bool {
		self.is_disabled
	}
}

/// Quad counts and memory usage of a mesh, see [NavQuadMesh::info]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MeshInfo {
	/// Number of quads in the arena, disabled ones included
	pub quad_count: usize,
	/// Number of quads created by the last build
	pub static_quad_count: usize,
	/// Approximate heap footprint of the mesh in bytes
	pub memory_bytes: usize,
}

/// The quad graph of one level grid
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Default, Reflect)]
pub struct NavQuadMesh {
	/// Grid dimensions as `(x, z)` cell counts
	size: IVec2,
	/// Agent footprint side length in cells
	agent_size: i32,
	/// Quad arena, static quads first then collider residuals
	quads: Vec<Quad>,
	/// Number of quads created by the last build
	static_count: usize,
	/// Connected component id per quad, empty until
	/// [NavQuadMesh::update_reachability] runs and cleared by any mutation
	groups: Vec<i32>,
	/// When set, entry points and waypoints are nudged off quad corners so
	/// actors cannot cut diagonally through them
	diagonal_corner_fix: bool,
}

impl NavQuadMesh {
	/// Create a new instance of [NavQuadMesh] covering `size` cells for agents
	/// with a square footprint of `agent_size` cells
	pub fn new(size: IVec2, agent_size: i32) -> Self {
		if size.x < 0 || size.y < 0 {
			panic!(
				"NavQuadMesh dimensions `({}, {})` cannot be negative",
				size.x, size.y
			);
		}
		if agent_size < 1 {
			panic!("agent size `{agent_size}` must be at least one cell");
		}
		NavQuadMesh {
			size,
			agent_size,
			quads: Vec::new(),
			static_count: 0,
			groups: Vec::new(),
			diagonal_corner_fix: true,
		}
	}
	/// Grid dimensions as `(x, z)` cell counts
	pub fn dimensions(&self) -> IVec2 {
		self.size
	}
	/// Agent footprint side length in cells
	pub fn agent_size(&self) -> i32 {
		self.agent_size
	}
	/// The quad arena, disabled quads included
	pub fn quads(&self) -> &[Quad] {
		&self.quads
	}
	/// Number of quads created by the last build
	pub fn static_quad_count(&self) -> usize {
		self.static_count
	}
	/// Whether corner correction is applied to entry points and waypoints
	pub fn diagonal_corner_fix(&self) -> bool {
		self.diagonal_corner_fix
	}
	/// Allow or forbid actors cutting diagonally through quad corners
	pub fn set_diagonal_corner_fix(&mut self, enabled: bool) {
		self.diagonal_corner_fix = enabled;
	}
	/// Rebuild the whole static mesh from a [HeightField], discarding any
	/// collider residuals
	pub fn build(&mut self, field: &HeightField) {
		let started = Instant::now();
		self.quads.clear();
		self.groups.clear();
		self.static_count = 0;

		// one walkability bitmap per distinct surface height, a cell being set
		// when the agent footprint can stand there on any level
		let cell_count = (self.size.x * self.size.y) as usize;
		let mut by_height: BTreeMap<i16, Vec<u8>> = BTreeMap::new();
		for z in 0..self.size.y {
			for x in 0..self.size.x {
				for level in 0..field.level_count() {
					if !field.test(x, z, level, self.agent_size) {
						continue;
					}
					let height = field.height(x, z, level);
					let bitmap = by_height
						.entry(height)
						.or_insert_with(|| vec![0u8; cell_count]);
					bitmap[(x + z * self.size.x) as usize] = 1;
				}
			}
		}

		let height_bands = by_height.len();
		let mut rects = Vec::new();
		for (height, bitmap) in by_height.iter() {
			rects.clear();
			let mut tz = 0;
			while tz < self.size.y {
				let mut tx = 0;
				while tx < self.size.x {
					partition_tile(bitmap, self.size, IVec2::new(tx, tz), &mut rects);
					tx += TILE_RESOLUTION as i32;
				}
				tz += TILE_RESOLUTION as i32;
			}
			for rect in rects.drain(..) {
				self.quads.push(Quad {
					rect,
					min_height: *height as i32,
					max_height: *height as i32,
					neighbours: Vec::new(),
					static_ncount: 0,
					is_disabled: false,
				});
			}
		}

		for a in 0..self.quads.len() {
			for b in (a + 1)..self.quads.len() {
				self.try_add_adjacency(a, b);
			}
		}

		self.static_count = self.quads.len();
		for quad in self.quads.iter_mut() {
			quad.static_ncount = quad.neighbours.len();
		}

		info!(
			"navigation mesh built: {} quads over {} height bands in {:?}",
			self.static_count,
			height_bands,
			started.elapsed()
		);
	}
	/// Connect two quads when their rects share a boundary segment and their
	/// height bands lie within one unit of each other
	fn try_add_adjacency(&mut self, a: usize, b: usize) {
		if a == b || self.quads[a].is_disabled || self.quads[b].is_disabled {
			return;
		}
		let qa = &self.quads[a];
		let qb = &self.quads[b];
		if qa.min_height > qb.max_height + 1 || qb.min_height > qa.max_height + 1 {
			return;
		}
		if !are_adjacent(&qa.rect, &qb.rect) {
			return;
		}
		self.quads[a].neighbours.push(b);
		self.quads[b].neighbours.push(a);
	}
	/// Carve a temporary obstacle out of the mesh. Every enabled quad the box
	/// overlaps (extended by the agent footprint and a small height margin) is
	/// disabled and replaced by up to four residual quads wired into the graph
	/// in its stead. Empty boxes are a no-op
	pub fn add_collider(&mut self, bbox: GridBox) {
		if bbox.is_empty() {
			return;
		}
		// grow the box so footprint corners, not centres, are kept clear, and
		// include surfaces just below its base
		let ext = GridBox::new(
			bbox.min - IVec3::new(self.agent_size - 1, 2, self.agent_size - 1),
			bbox.max,
		);
		let footprint = ext.footprint();

		// residual quads never overlap the collider that spawned them, so one
		// scan up front finds every quad that needs splitting
		let worklist: Vec<usize> = self
			.quads
			.iter()
			.enumerate()
			.filter(|(_, quad)| {
				!quad.is_disabled
					&& quad.max_height >= ext.min.y
					&& quad.min_height < ext.max.y
					&& quad.rect.overlaps(&footprint)
			})
			.map(|(id, _)| id)
			.collect();

		let before = self.quads.len();
		for id in worklist.iter() {
			self.split_quad(*id, &footprint);
		}
		self.groups.clear();

		debug!(
			"collider split {} quads into {} residuals",
			worklist.len(),
			self.quads.len() - before
		);
	}
	/// Disable a quad and append residual quads tiling the part of its rect
	/// the collider footprint misses. The four residuals pinwheel around the
	/// overlap:
	///
	/// ```text
	///  _____________________
	/// |         A       |   |
	/// |________ ________|   |
	/// |    |            | B |
	/// | C  | footprint  |___|
	/// |    |________ ___|___|
	/// |____|________D_______|
	/// ```
	fn split_quad(&mut self, quad_id: usize, footprint: &GridRect) {
		let parent = self.quads[quad_id].rect;
		let crect = parent.intersection(footprint);
		if crect.is_empty() {
			return;
		}
		let min_height = self.quads[quad_id].min_height;
		let max_height = self.quads[quad_id].max_height;
		let parent_neighbours = self.quads[quad_id].neighbours.clone();
		self.quads[quad_id].is_disabled = true;

		let residuals = [
			GridRect::new(parent.min, IVec2::new(crect.max.x, crect.min.y)),
			GridRect::new(
				IVec2::new(crect.max.x, parent.min.y),
				IVec2::new(parent.max.x, crect.max.y),
			),
			GridRect::new(
				IVec2::new(parent.min.x, crect.min.y),
				IVec2::new(crect.min.x, parent.max.y),
			),
			GridRect::new(IVec2::new(crect.min.x, crect.max.y), parent.max),
		];

		let mut siblings: Vec<usize> = Vec::with_capacity(4);
		for rect in residuals.into_iter().filter(|r| !r.is_empty()) {
			let id = self.quads.len();
			self.quads.push(Quad {
				rect,
				min_height,
				max_height,
				neighbours: Vec::new(),
				static_ncount: 0,
				is_disabled: false,
			});
			for &neighbour in parent_neighbours.iter() {
				self.try_add_adjacency(id, neighbour);
			}
			for &sibling in siblings.iter() {
				self.try_add_adjacency(id, sibling);
			}
			siblings.push(id);
		}
	}
	/// Undo every collider at once, restoring the mesh to its as-built state
	pub fn remove_colliders(&mut self) {
		self.quads.truncate(self.static_count);
		for quad in self.quads.iter_mut() {
			quad.neighbours.truncate(quad.static_ncount);
			quad.is_disabled = false;
		}
		self.groups.clear();
	}
	/// Locate the quad containing a world point, preferring one whose height
	/// band covers `pos.y` and falling back to the highest surface below it
	pub fn find_quad(&self, pos: IVec3, find_disabled: bool) -> Option<usize> {
		let cell = as_xz(pos);
		let mut best = None;
		let mut best_height = i32::MIN;
		for (id, quad) in self.quads.iter().enumerate() {
			if quad.is_disabled != find_disabled || !quad.rect.contains(cell) {
				continue;
			}
			if pos.y >= quad.min_height && pos.y <= quad.max_height {
				return Some(id);
			}
			if quad.max_height < pos.y && quad.max_height > best_height {
				best_height = quad.max_height;
				best = Some(id);
			}
		}
		best
	}
	/// Recompute the connected component id of every enabled quad
	pub fn update_reachability(&mut self) {
		self.groups = vec![UNGROUPED; self.quads.len()];
		let mut group = 0;
		let mut stack = Vec::new();
		for seed in 0..self.quads.len() {
			if self.quads[seed].is_disabled || self.groups[seed] != UNGROUPED {
				continue;
			}
			self.groups[seed] = group;
			stack.push(seed);
			while let Some(id) = stack.pop() {
				for n in 0..self.quads[id].neighbours.len() {
					let neighbour = self.quads[id].neighbours[n];
					if !self.quads[neighbour].is_disabled && self.groups[neighbour] == UNGROUPED {
						self.groups[neighbour] = group;
						stack.push(neighbour);
					}
				}
			}
			group += 1;
		}
	}
	/// Whether two quads sit in the same connected component per the last
	/// [NavQuadMesh::update_reachability] call. Answers `true` when the group
	/// data is stale or was never computed, so callers can only use this as a
	/// cheap early-out, never as proof a path exists
	pub fn is_reachable(&self, from: usize, target: usize) -> bool {
		if self.groups.len() != self.quads.len() {
			return true;
		}
		self.groups[from] != UNGROUPED && self.groups[from] == self.groups[target]
	}
	/// Outline segments of every enabled quad at its surface height, for an
	/// external debug renderer
	pub fn visualize(&self) -> Vec<(IVec3, IVec3)> {
		let mut lines = Vec::new();
		for quad in self.quads.iter().filter(|q| !q.is_disabled) {
			let height = quad.max_height;
			let corners = [
				as_xzy(quad.rect.min, height),
				as_xzy(IVec2::new(quad.rect.max.x, quad.rect.min.y), height),
				as_xzy(quad.rect.max, height),
				as_xzy(IVec2::new(quad.rect.min.x, quad.rect.max.y), height),
			];
			for n in 0..4 {
				lines.push((corners[n], corners[(n + 1) % 4]));
			}
		}
		lines
	}
	/// Line segments joining consecutive waypoints of a path
	pub fn visualize_path(&self, path: &[IVec3]) -> Vec<(IVec3, IVec3)> {
		path.windows(2).map(|pair| (pair[0], pair[1])).collect()
	}
	/// Quad counts and approximate memory usage
	pub fn info(&self) -> MeshInfo {
		let mut memory_bytes = std::mem::size_of::<Self>()
			+ self.quads.capacity() * std::mem::size_of::<Quad>()
			+ self.groups.capacity() * std::mem::size_of::<i32>();
		for quad in self.quads.iter() {
			memory_bytes += quad.neighbours.capacity() * std::mem::size_of::<usize>();
		}
		let info = MeshInfo {
			quad_count: self.quads.len(),
			static_quad_count: self.static_count,
			memory_bytes,
		};
		debug!(
			"mesh info: {} quads ({} static), ~{} bytes",
			info.quad_count, info.static_quad_count, info.memory_bytes
		);
		info
	}
}
