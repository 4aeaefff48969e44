//! Path search over the quad graph of a [NavQuadMesh].
//!
//! The search runs A* over quads but scores crossings with exact entry
//! points: whenever a quad is entered the precise cell on the shared boundary
//! is computed by projecting the current position diagonally toward the goal,
//! so path costs reflect where the boundary is actually crossed instead of
//! quad centres. A refinement pass then shortcuts zig-zags the greedy entry
//! points leave behind, and a final conversion emits world waypoints with the
//! diagonal and straight runs of each segment split apart.
//!
//! All scratch state lives in per-call buffers, so searches borrow the mesh
//! immutably and can run concurrently.
//!

use crate::prelude::*;
use bevy::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An entry point into a quad along a path
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PathNode {
	/// The cell where the path crosses into the quad
	pub point: IVec2,
	/// Index of the quad being entered
	pub quad_id: usize,
}

/// Per-quad search scratch, allocated fresh for every query
#[derive(Clone, Copy)]
struct SearchState {
	/// The cell where the best known path enters this quad
	entry_pos: IVec2,
	/// Predecessor quad on the best known path
	src_quad: Option<usize>,
	/// Cost of the best known path to `entry_pos`
	dist: f32,
	/// Octile estimate from `entry_pos` to the goal
	est_dist: f32,
	/// Settled quads are never relaxed again
	is_finished: bool,
}

impl Default for SearchState {
	fn default() -> Self {
		SearchState {
			entry_pos: IVec2::ZERO,
			src_quad: None,
			dist: f32::INFINITY,
			est_dist: 0.0,
			is_finished: false,
		}
	}
}

/// Min-heap entry keyed on `dist + est_dist`. Entries go stale when a quad is
/// relaxed again before being popped; stale pops are recognised by the
/// finished flag and skipped
#[derive(Clone, Copy, Debug)]
struct HeapEntry {
	/// Priority of the entry at push time
	key: f32,
	/// Quad the entry refers to
	quad_id: usize,
}

impl PartialEq for HeapEntry {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for HeapEntry {
	/// Reversed so [BinaryHeap] pops the smallest key first
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.key
			.total_cmp(&self.key)
			.then_with(|| other.quad_id.cmp(&self.quad_id))
	}
}

impl NavQuadMesh {
	/// Sum of octile hop lengths along a node list
	fn nodes_length(nodes: &[PathNode]) -> f32 {
		nodes
			.windows(2)
			.map(|pair| octile_distance(pair[0].point, pair[1].point))
			.sum()
	}
	/// Search the quad graph from `start` (inside `start_id`) to `end`
	/// (inside `end_id`), returning entry points per traversed quad with the
	/// end point as the final node, or an empty list when no path exists.
	///
	/// With `refine` set the relaxation keys on reached distance alone and a
	/// shortcut pass reworks the result; the refinement's own sub-searches
	/// run with `refine` unset and key on distance plus estimate
	pub fn find_path_nodes(
		&self,
		start: IVec2,
		end: IVec2,
		start_id: usize,
		end_id: usize,
		refine: bool,
	) -> Vec<PathNode> {
		let quads = self.quads();
		if quads[start_id].is_disabled() || quads[end_id].is_disabled() {
			return Vec::new();
		}

		let mut state = vec![SearchState::default(); quads.len()];
		state[start_id].dist = 0.0;
		state[start_id].est_dist = octile_distance(start, end);
		state[start_id].entry_pos = start;

		let mut heap = BinaryHeap::new();
		heap.push(HeapEntry {
			key: state[start_id].est_dist,
			quad_id: start_id,
		});
		let mut end_reached = start_id == end_id;

		while let Some(entry) = heap.pop() {
			let quad_id = entry.quad_id;
			if quad_id == end_id {
				break;
			}
			if state[quad_id].is_finished {
				continue;
			}
			state[quad_id].is_finished = true;

			let quad1 = &quads[quad_id];
			let entry_pos = state[quad_id].entry_pos;
			let dist1 = state[quad_id].dist;

			for &quad2_id in quad1.neighbours() {
				let quad2 = &quads[quad2_id];
				if state[quad2_id].is_finished || quad2.is_disabled() {
					continue;
				}

				// project the current position diagonally toward the goal's
				// closest cell on the shared boundary
				let edge = shared_edge(quad1.rect(), quad2.rect());
				let edge_end_pos = end.clamp(edge.min, edge.max);
				let vec = MoveVector::new(entry_pos, edge_end_pos);

				let mut closest_pos = (entry_pos + vec.vec * vec.ddiag)
					.clamp(quad2.rect().min, quad2.rect().max - IVec2::ONE);
				closest_pos =
					closest_pos.clamp(quad1.rect().min - IVec2::ONE, quad1.rect().max);

				if self.diagonal_corner_fix() {
					// crossing exactly at the neighbour's extreme cell would
					// let the actor clip the corner of whatever sits beside it
					let r1 = quad1.rect();
					let r2 = quad2.rect();
					if r1.max.x > r2.min.x && r1.min.x < r2.max.x {
						if entry_pos.x < closest_pos.x
							&& closest_pos.x == r2.min.x && closest_pos.x < r2.max.x - 1
						{
							closest_pos.x += 1;
						}
						if entry_pos.x > closest_pos.x
							&& closest_pos.x == r2.max.x - 1 && closest_pos.x > r2.min.x
						{
							closest_pos.x -= 1;
						}
					} else {
						if entry_pos.y < closest_pos.y
							&& closest_pos.y == r2.min.y && closest_pos.y < r2.max.y - 1
						{
							closest_pos.y += 1;
						}
						if entry_pos.y > closest_pos.y
							&& closest_pos.y == r2.max.y - 1 && closest_pos.y > r2.min.y
						{
							closest_pos.y -= 1;
						}
					}
				}

				let mut dist = octile_distance(closest_pos, entry_pos) + dist1;
				let est_dist = octile_distance(closest_pos, end);
				if quad2_id == end_id {
					end_reached = true;
					// the hop from the boundary to the end point itself
					dist += est_dist;
				}

				let next = &state[quad2_id];
				let skip = if refine {
					next.dist <= dist
				} else {
					next.dist + next.est_dist <= dist + est_dist
				};
				if skip {
					continue;
				}

				let next = &mut state[quad2_id];
				next.dist = dist;
				next.est_dist = est_dist;
				next.entry_pos = closest_pos;
				next.src_quad = Some(quad_id);
				heap.push(HeapEntry {
					key: dist + est_dist,
					quad_id: quad2_id,
				});
			}
		}

		if !end_reached {
			return Vec::new();
		}

		let mut out = vec![PathNode {
			point: end,
			quad_id: end_id,
		}];
		let mut cursor = Some(end_id);
		while let Some(quad_id) = cursor {
			if out[out.len() - 1].point != state[quad_id].entry_pos {
				out.push(PathNode {
					point: state[quad_id].entry_pos,
					quad_id,
				});
			}
			cursor = state[quad_id].src_quad;
		}
		out.reverse();

		if refine {
			// slide a four-node window along the path and re-search any
			// stretch a direct line would beat, splicing in strictly shorter
			// alternatives and rescanning the same window after a splice
			let mut n = 0;
			while n + 3 < out.len() {
				let dist = octile_distance(out[n].point, out[n + 1].point)
					+ octile_distance(out[n + 1].point, out[n + 2].point)
					+ octile_distance(out[n + 2].point, out[n + 3].point);
				let sdist = octile_distance(out[n].point, out[n + 3].point);
				if sdist * 1.001 >= dist {
					n += 1;
					continue;
				}

				let other = self.find_path_nodes(
					out[n].point,
					out[n + 3].point,
					out[n].quad_id,
					out[n + 3].quad_id,
					false,
				);
				if other.len() >= 2 && Self::nodes_length(&other) + 0.01 < dist {
					out.splice(n + 1..n + 3, other[1..other.len() - 1].iter().copied());
					continue;
				}
				n += 1;
			}
		}

		out
	}
	/// Find a world-space waypoint path from `start` to `end`, or an empty
	/// list when either point misses the mesh or no route exists.
	///
	/// Each node-to-node segment is split into its diagonal and straight
	/// runs, ordered to extend whatever direction the previous segment ended
	/// with, then collinear runs at equal height collapse into single
	/// waypoints
	pub fn find_path(&self, start: IVec3, end: IVec3) -> Vec<IVec3> {
		let (Some(start_id), Some(end_id)) =
			(self.find_quad(start, false), self.find_quad(end, false))
		else {
			return Vec::new();
		};

		let input = self.find_path_nodes(as_xz(start), as_xz(end), start_id, end_id, true);
		if input.is_empty() {
			return Vec::new();
		}

		let quads = self.quads();
		let mut path: Vec<IVec3> = Vec::with_capacity(input.len() * 3);

		for n in 0..input.len() - 1 {
			let src_rect = *quads[input[n].quad_id].rect();
			let dst_rect = *quads[input[n + 1].quad_id].rect();
			let src = input[n].point;
			let dst = input[n + 1].point;

			let vec = MoveVector::new(src, dst);
			let prev_vec = match path.last() {
				Some(prev) => MoveVector::new(as_xz(*prev), src),
				None => MoveVector::default(),
			};
			let is_horizontal = src_rect.max.x > dst_rect.min.x && src_rect.min.x < dst_rect.max.x;
			let prev_diag = prev_vec.ddiag != 0;
			let prev_dx = prev_vec.dx != 0;

			// when the turn shape allows it, pull the target one step back
			// toward the source so the diagonal run ends inside the boundary
			let mut pdst = dst;
			if input[n].quad_id != input[n + 1].quad_id
				&& vec.ddiag != 0
				&& (!(prev_diag || prev_dx != (vec.dx != 0)) || (vec.dx == 0 && vec.dy == 0))
			{
				pdst.x -= (pdst.x - src.x).signum();
				pdst.y -= (pdst.y - src.y).signum();
			}
			pdst = pdst.clamp(src_rect.min, src_rect.max - IVec2::ONE);

			if self.diagonal_corner_fix() {
				if is_horizontal {
					pdst.x = pdst.x.clamp(dst_rect.min.x, dst_rect.max.x - 1);
				} else {
					pdst.y = pdst.y.clamp(dst_rect.min.y, dst_rect.max.y - 1);
				}
			}

			let vec = MoveVector::new(src, pdst);
			let mut mid = src;
			if (prev_diag || prev_dx != (vec.dx != 0)) && vec.ddiag != 0 {
				mid += vec.vec * vec.ddiag;
			} else if vec.dx != 0 {
				mid.x += vec.vec.x * vec.dx;
			} else {
				mid.y += vec.vec.y * vec.dy;
			}

			let src_height = quads[input[n].quad_id].max_height();
			let dst_height = quads[input[n + 1].quad_id].max_height();
			path.push(as_xzy(src, src_height));
			path.push(as_xzy(mid, src_height));
			path.push(as_xzy(pdst, src_height.max(dst_height)));
		}
		let last = &input[input.len() - 1];
		path.push(as_xzy(last.point, quads[last.quad_id].max_height()));

		// collapse collinear runs, dropping zero-length segments
		let mut simplified: Vec<IVec3> = vec![path[0]];
		let mut last_vec = IVec2::ZERO;
		for n in 1..path.len() {
			let cur = path[n];
			let prev = simplified[simplified.len() - 1];
			let cur_vec = MoveVector::new(as_xz(prev), as_xz(cur)).vec;
			if cur_vec == IVec2::ZERO {
				continue;
			}
			if cur_vec != last_vec || cur.y != prev.y {
				simplified.push(cur);
				last_vec = cur_vec;
			} else {
				let back = simplified.len() - 1;
				simplified[back] = cur;
			}
		}
		simplified
	}
}
