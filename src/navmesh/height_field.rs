//! The [HeightField] derives, for every `(x, z)` grid cell, an ordered list
//! of discrete vertical levels from the raw walkable/blocker boxes of a
//! level. Each level entry is either the walkable top height at that cell or
//! an invalid marker where a blocker removed it.
//!
//! The field is rebuilt wholesale whenever the box sets change (level load or
//! reload) and never mutated incrementally.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Maximum number of discrete vertical levels a single cell can carry;
/// geometry producing more levels at a cell silently drops the excess, a
/// documented capacity limit rather than an error
pub const MAX_LEVELS: usize = 16;
/// Heights are clipped into `0..=MAX_WORLD_HEIGHT`
pub const MAX_WORLD_HEIGHT: i32 = 255;
/// Marker for a level entry removed by a blocker or never populated
const INVALID_HEIGHT: i16 = -1;
/// Near-coplanar geometry within this height band merges into one level
/// instead of spawning a new one
const MERGE_TOLERANCE: i32 = 4;
/// Largest agent footprint supported by [HeightField::test]
const MAX_FOOTPRINT: i32 = 8;

/// Per-cell vertical level data for a whole level grid
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Default, Reflect)]
pub struct HeightField {
	/// Level entries laid out level-major then row-major, see
	/// [HeightField::index]
	data: Vec<i16>,
	/// Number of levels currently allocated across the grid
	level_count: usize,
	/// Grid dimensions as `(x, z)` cell counts
	size: IVec2,
}

impl HeightField {
	/// Create a new instance of [HeightField] covering `size` cells
	pub fn new(size: IVec2) -> Self {
		if size.x < 0 || size.y < 0 {
			panic!(
				"HeightField dimensions `({}, {})` cannot be negative",
				size.x, size.y
			);
		}
		HeightField {
			data: Vec::new(),
			level_count: 0,
			size,
		}
	}
	/// Grid dimensions as `(x, z)` cell counts
	pub fn dimensions(&self) -> IVec2 {
		self.size
	}
	/// Number of levels currently allocated across the grid
	pub fn level_count(&self) -> usize {
		self.level_count
	}
	/// Flat index of a cell at a level
	fn index(&self, x: i32, z: i32, level: usize) -> usize {
		(x + (level as i32 * self.size.y + z) * self.size.x) as usize
	}
	/// The stored walkable top height of a cell at a level, negative when the
	/// entry is invalid
	pub fn height(&self, x: i32, z: i32, level: usize) -> i16 {
		self.data[self.index(x, z, level)]
	}
	/// Grow the field by one level of invalid entries
	fn add_level(&mut self) {
		assert!(self.level_count < MAX_LEVELS);
		self.level_count += 1;
		self.data
			.resize((self.size.x * self.size.y) as usize * self.level_count, INVALID_HEIGHT);
	}
	/// Clip a box to the grid bounds and the supported height range
	fn clip(&self, bbox: &GridBox) -> GridBox {
		GridBox::new(
			bbox.min.max(IVec3::ZERO),
			bbox.max
				.min(IVec3::new(self.size.x, MAX_WORLD_HEIGHT, self.size.y)),
		)
	}
	/// Rebuild all level data from scratch out of the walkable and blocker
	/// boxes of a level
	pub fn update(&mut self, walkable: &[GridBox], blockers: &[GridBox]) {
		self.level_count = 0;
		self.data.clear();

		let mut bboxes: Vec<GridBox> = walkable.iter().map(|b| self.clip(b)).collect();
		// lower floors are processed first so they claim the lower levels
		bboxes.sort_by_key(|b| (b.min.y, b.min.x, b.min.z));

		for bbox in bboxes.iter() {
			let min_y = bbox.min.y;
			let max_y = bbox.max.y;

			for z in bbox.min.z..bbox.max.z {
				for x in bbox.min.x..bbox.max.x {
					let mut level = 0;
					while level < self.level_count {
						let value = self.data[self.index(x, z, level)];
						if value == INVALID_HEIGHT || value as i32 >= min_y - MERGE_TOLERANCE {
							break;
						}
						level += 1;
					}
					if level == self.level_count {
						if level == MAX_LEVELS {
							continue;
						}
						self.add_level();
					}
					let idx = self.index(x, z, level);
					self.data[idx] = max_y as i16;
				}
			}
		}

		for bbox in blockers.iter().map(|b| self.clip(b)).collect::<Vec<_>>() {
			for z in bbox.min.z..bbox.max.z {
				for x in bbox.min.x..bbox.max.x {
					for level in 0..self.level_count {
						let idx = self.index(x, z, level);
						let value = self.data[idx];
						if value != INVALID_HEIGHT
							&& value as i32 >= bbox.min.y - MERGE_TOLERANCE
							&& value as i32 <= bbox.max.y
						{
							self.data[idx] = INVALID_HEIGHT;
						}
					}
				}
			}
		}
	}
	/// Whether an agent whose square footprint spans `extents` cells can
	/// stand at a cell on a level: every footprint cell must carry a valid
	/// height within one unit of its row-scan predecessor, falling back to
	/// alternate levels where the primary level is discontinuous, and a
	/// second pass applies the same tolerance across row and diagonal
	/// neighbours
	pub fn test(&self, x: i32, z: i32, level: usize, extents: i32) -> bool {
		assert!(level < self.level_count);
		assert!(extents <= MAX_FOOTPRINT);

		if x < 0 || z < 0 || x + extents > self.size.x || z + extents > self.size.y {
			return false;
		}
		if self.data[self.index(x, z, level)] == INVALID_HEIGHT {
			return false;
		}

		let mut heights = [[0i16; MAX_FOOTPRINT as usize]; MAX_FOOTPRINT as usize];
		heights[0][0] = self.data[self.index(x, z, level)];

		for tz in 0..extents {
			let mut prev = heights[if tz == 0 { 0 } else { tz as usize - 1 }][0];
			for tx in 0..extents {
				let mut height = self.data[self.index(x + tx, z + tz, level)];
				if height == INVALID_HEIGHT || (height - prev).abs() > 1 {
					for l in 0..self.level_count {
						height = self.data[self.index(x + tx, z + tz, l)];
						if height >= 0 && (height - prev).abs() <= 1 {
							break;
						}
					}
				}
				if height == INVALID_HEIGHT || (height - prev).abs() > 1 {
					return false;
				}
				heights[tz as usize][tx as usize] = height;
				prev = height;
			}
		}

		for tz in 0..extents as usize - 1 {
			for tx in 0..extents as usize - 1 {
				if (heights[tz][tx] - heights[tz + 1][tx]).abs() > 1
					|| (heights[tz][tx] - heights[tz + 1][tx + 1]).abs() > 1
				{
					return false;
				}
			}
		}

		true
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// A flat slab covering the whole grid with its top at `height`
	fn slab(size: IVec2, height: i32) -> GridBox {
		GridBox::new(IVec3::ZERO, IVec3::new(size.x, height, size.y))
	}
	#[test]
	fn single_box_single_level() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		field.update(&[slab(size, 1)], &[]);
		assert_eq!(field.level_count(), 1);
		for z in 0..8 {
			for x in 0..8 {
				assert_eq!(field.height(x, z, 0), 1);
			}
		}
	}
	#[test]
	fn stacked_boxes_two_levels() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		// ground floor plus a bridge 20 units up spanning two columns
		let bridge = GridBox::new(IVec3::new(2, 19, 0), IVec3::new(4, 20, 8));
		field.update(&[slab(size, 1), bridge], &[]);
		assert_eq!(field.level_count(), 2);
		assert_eq!(field.height(2, 4, 0), 1);
		assert_eq!(field.height(2, 4, 1), 20);
		// cells without the bridge keep an invalid second level
		assert!(field.height(6, 4, 1) < 0);
	}
	#[test]
	fn near_coplanar_boxes_merge() {
		let size = IVec2::new(4, 4);
		let mut field = HeightField::new(size);
		// second slab bottom sits within the merge tolerance of the first top
		let a = GridBox::new(IVec3::new(0, 0, 0), IVec3::new(4, 2, 4));
		let b = GridBox::new(IVec3::new(0, 4, 0), IVec3::new(4, 5, 4));
		field.update(&[a, b], &[]);
		assert_eq!(field.level_count(), 1);
		assert_eq!(field.height(1, 1, 0), 5);
	}
	#[test]
	fn blocker_invalidates_levels() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		let blocker = GridBox::new(IVec3::new(3, 0, 3), IVec3::new(5, 10, 5));
		field.update(&[slab(size, 1)], &[blocker]);
		assert!(field.height(3, 3, 0) < 0);
		assert!(field.height(4, 4, 0) < 0);
		assert_eq!(field.height(2, 2, 0), 1);
	}
	#[test]
	fn blocker_above_headroom_ignored() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		// blocker floats far above the walkable surface
		let blocker = GridBox::new(IVec3::new(0, 50, 0), IVec3::new(8, 60, 8));
		field.update(&[slab(size, 1)], &[blocker]);
		assert_eq!(field.height(4, 4, 0), 1);
	}
	#[test]
	fn level_cap_silently_drops_excess() {
		let size = IVec2::new(2, 2);
		let mut field = HeightField::new(size);
		// 20 well-separated floors over the same cell, only 16 can be kept
		let mut boxes = Vec::new();
		for n in 0..20 {
			let y = n * 10;
			boxes.push(GridBox::new(
				IVec3::new(0, y, 0),
				IVec3::new(2, y + 1, 2),
			));
		}
		field.update(&boxes, &[]);
		assert_eq!(field.level_count(), MAX_LEVELS);
	}
	#[test]
	fn rebuild_resets_previous_data() {
		let size = IVec2::new(4, 4);
		let mut field = HeightField::new(size);
		field.update(&[slab(size, 5)], &[]);
		field.update(&[slab(size, 1)], &[]);
		assert_eq!(field.level_count(), 1);
		assert_eq!(field.height(0, 0, 0), 1);
	}
	#[test]
	fn test_accepts_flat_footprint() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		field.update(&[slab(size, 1)], &[]);
		assert!(field.test(0, 0, 0, 3));
		assert!(field.test(5, 5, 0, 3));
	}
	#[test]
	fn test_rejects_footprint_off_grid() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		field.update(&[slab(size, 1)], &[]);
		assert!(!field.test(6, 6, 0, 3));
	}
	#[test]
	fn test_accepts_one_unit_step() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		let low = GridBox::new(IVec3::new(0, 0, 0), IVec3::new(4, 1, 8));
		let high = GridBox::new(IVec3::new(4, 1, 0), IVec3::new(8, 2, 8));
		field.update(&[low, high], &[]);
		assert!(field.test(3, 3, 0, 2));
	}
	#[test]
	fn test_rejects_two_unit_cliff() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		let low = GridBox::new(IVec3::new(0, 0, 0), IVec3::new(4, 1, 8));
		let high = GridBox::new(IVec3::new(4, 2, 0), IVec3::new(8, 3, 8));
		field.update(&[low, high], &[]);
		assert!(!field.test(3, 3, 0, 2));
	}
	#[test]
	fn test_falls_back_to_alternate_levels() {
		let size = IVec2::new(8, 8);
		let mut field = HeightField::new(size);
		// a low shelf claims level 0 on the eastern half, so the walkway
		// spanning the full grid lands on level 0 in the west but level 1 in
		// the east; footprints across the seam must chase the walkway height
		// through the alternate level
		let shelf = GridBox::new(IVec3::new(4, 0, 0), IVec3::new(8, 2, 8));
		let walkway = GridBox::new(IVec3::new(0, 9, 0), IVec3::new(8, 10, 8));
		field.update(&[shelf, walkway], &[]);
		assert_eq!(field.height(3, 3, 0), 10);
		assert_eq!(field.height(4, 3, 0), 2);
		assert_eq!(field.height(4, 3, 1), 10);
		assert!(field.test(3, 3, 0, 2));
	}
}
