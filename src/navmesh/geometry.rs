//! Integer rectangle and box primitives plus the grid distance helpers used
//! across the navigation mesh
//!

use bevy::prelude::*;

/// An axis-aligned rectangle in integer grid coordinates where `min` is
/// inclusive and `max` is exclusive
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Reflect)]
pub struct GridRect {
	/// Inclusive corner closest to the origin
	pub min: IVec2,
	/// Exclusive corner furthest from the origin
	pub max: IVec2,
}

impl GridRect {
	/// Create a new instance of [GridRect]
	pub fn new(min: IVec2, max: IVec2) -> Self {
		GridRect { min, max }
	}
	/// Number of cells along the `x` axis
	pub fn width(&self) -> i32 {
		self.max.x - self.min.x
	}
	/// Number of cells along the `y` axis
	pub fn height(&self) -> i32 {
		self.max.y - self.min.y
	}
	/// A rect covers no cells when either axis has non-positive extent
	pub fn is_empty(&self) -> bool {
		self.max.x <= self.min.x || self.max.y <= self.min.y
	}
	/// Whether a cell lies within the rect (`max` exclusive)
	pub fn contains(&self, point: IVec2) -> bool {
		point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
	}
	/// The overlapping region of two rects, possibly empty
	pub fn intersection(&self, other: &GridRect) -> GridRect {
		GridRect::new(self.min.max(other.min), self.max.min(other.max))
	}
	/// Whether two rects cover at least one common cell
	pub fn overlaps(&self, other: &GridRect) -> bool {
		!self.intersection(other).is_empty()
	}
}

/// An axis-aligned box in integer grid coordinates with `y` as the vertical
/// axis, `min` inclusive and `max` exclusive
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Reflect)]
pub struct GridBox {
	/// Inclusive corner closest to the origin
	pub min: IVec3,
	/// Exclusive corner furthest from the origin
	pub max: IVec3,
}

impl GridBox {
	/// Create a new instance of [GridBox]
	pub fn new(min: IVec3, max: IVec3) -> Self {
		GridBox { min, max }
	}
	/// A box covers no cells when any axis has non-positive extent
	pub fn is_empty(&self) -> bool {
		self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z
	}
	/// The `(x, z)` ground footprint of the box
	pub fn footprint(&self) -> GridRect {
		GridRect::new(
			IVec2::new(self.min.x, self.min.z),
			IVec2::new(self.max.x, self.max.z),
		)
	}
}

/// Assemble a world point from a ground cell and a height, world axes being
/// `(x, y-up, z)`
pub fn as_xzy(point: IVec2, height: i32) -> IVec3 {
	IVec3::new(point.x, height, point.y)
}

/// The `(x, z)` ground cell of a world point
pub fn as_xz(point: IVec3) -> IVec2 {
	IVec2::new(point.x, point.z)
}

/// Whether two rects share a boundary segment (touching edges, not corners,
/// and not overlapping)
pub fn are_adjacent(a: &GridRect, b: &GridRect) -> bool {
	if b.min.x < a.max.x && a.min.x < b.max.x {
		return a.max.y == b.min.y || a.min.y == b.max.y;
	}
	if b.min.y < a.max.y && a.min.y < b.max.y {
		return a.max.x == b.min.x || a.min.x == b.max.x;
	}
	false
}

/// The boundary segment between two adjacent rects expressed as an inclusive
/// coordinate range of cells inside `b` that touch `a`; unlike [GridRect]
/// elsewhere, both `min` and `max` here are valid cells to clamp onto
pub fn shared_edge(a: &GridRect, b: &GridRect) -> GridRect {
	let is_horizontal = a.max.x > b.min.x && a.min.x < b.max.x;
	let mut edge = GridRect::new(a.min.max(b.min), a.max.min(b.max));

	if is_horizontal {
		edge.max.x -= 1;
		if a.min.y > b.min.y {
			edge.min.y -= 1;
			edge.max.y -= 1;
		}
	} else {
		edge.max.y -= 1;
		if a.min.x > b.min.x {
			edge.min.x -= 1;
			edge.max.x -= 1;
		}
	}

	debug_assert!(
		edge.max.x >= edge.min.x || edge.max.y >= edge.min.y,
		"shared_edge called on non-adjacent rects {:?} and {:?}",
		a,
		b
	);
	edge
}

/// Octile distance between two cells: diagonal movement costs `√2`, computed
/// as `dx + dy - (2 - √2) * min(dx, dy)`
pub fn octile_distance(a: IVec2, b: IVec2) -> f32 {
	let dist_x = (a.x - b.x).abs();
	let dist_y = (a.y - b.y).abs();
	let dist_diag = dist_x.min(dist_y);
	dist_diag as f32 * (std::f32::consts::SQRT_2 - 2.0) + (dist_x + dist_y) as f32
}

/// Decomposition of a grid displacement into a per-axis step direction, a
/// number of diagonal steps and the remaining straight steps along one axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveVector {
	/// Step direction per axis, each component in `{-1, 0, 1}`
	pub vec: IVec2,
	/// Straight steps along `x` remaining after the diagonal run
	pub dx: i32,
	/// Straight steps along `y` remaining after the diagonal run
	pub dy: i32,
	/// Number of diagonal steps
	pub ddiag: i32,
}

impl MoveVector {
	/// Decompose the displacement from `start` to `end`
	pub fn new(start: IVec2, end: IVec2) -> Self {
		let diff = end - start;
		let vec = IVec2::new(diff.x.signum(), diff.y.signum());
		let mut dx = diff.x.abs();
		let mut dy = diff.y.abs();
		let ddiag = dx.min(dy);
		dx -= ddiag;
		dy -= ddiag;
		MoveVector { vec, dx, dy, ddiag }
	}
}
