//! Greedy maximal-rectangle partitioning of a walkability bitmap.
//!
//! Repeatedly extracts the best-scoring rectangle of set cells until the
//! bitmap is exhausted, producing an exact non-overlapping tiling. The score
//! `min(w, h)² + w * h` biases toward square, locally-maximal shapes over
//! long thin strips, which keeps the quad graph small and improves path
//! corner quality. The greedy choice is deterministic and fast but not
//! globally optimal in rectangle count - a conscious trade-off.
//!
//! Extraction is restricted to bounded working tiles so the per-column
//! run-length and skip arrays stay small regardless of level size.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Side length of the square working tile the partitioner operates within
pub const TILE_RESOLUTION: usize = 256;

/// Find the best-scoring rectangle of set cells using the monotonic-stack
/// histogram technique: `counts` holds per-column vertical run-lengths ending
/// at each row, `skips` the distance to the next set cell along the row
fn find_best_rect(counts: &[i16], skips: &[i16], size: IVec2) -> GridRect {
	let mut best = GridRect::default();
	let mut best_score = -1;
	// (leftmost extendable column, run height) pairs, heights increasing
	let mut stack: Vec<(i32, i32)> = Vec::with_capacity(size.x as usize);

	for sy in 0..size.y {
		stack.clear();
		let mut sx = 0;
		while sx <= size.x {
			let offset = (sx + sy * TILE_RESOLUTION as i32) as usize;
			let height = if sx == size.x { 0 } else { counts[offset] as i32 };
			let mut min_sx = sx;

			while let Some(&(start_x, run)) = stack.last() {
				if run <= height {
					break;
				}
				stack.pop();

				let w = sx - start_x;
				let h = run;
				let tmin = w.min(h);
				let score = tmin * tmin + w * h;

				if score > best_score {
					best = GridRect::new(IVec2::new(start_x, sy - h + 1), IVec2::new(sx, sy + 1));
					best_score = score;
				}
				min_sx = min_sx.min(start_x);
			}

			if height > 0 {
				stack.push((min_sx, height));
			}

			sx += if height > 0 || sx == size.x {
				1
			} else {
				skips[offset] as i32
			};
		}
	}

	best
}

/// Extract rectangles exactly tiling the set cells of `bitmap` within the
/// working tile anchored at `tile_origin`, appending them (in bitmap
/// coordinates) to `out`
pub fn partition_tile(bitmap: &[u8], bitmap_size: IVec2, tile_origin: IVec2, out: &mut Vec<GridRect>) {
	let size = IVec2::new(
		(TILE_RESOLUTION as i32).min(bitmap_size.x - tile_origin.x),
		(TILE_RESOLUTION as i32).min(bitmap_size.y - tile_origin.y),
	);

	let mut pixels = 0;
	let mut counts = vec![0i16; TILE_RESOLUTION * size.y as usize];
	let mut skips = vec![0i16; TILE_RESOLUTION * size.y as usize];

	for y in 0..size.y {
		let yoff = (y * TILE_RESOLUTION as i32) as usize;
		for x in 0..size.x {
			let cell = bitmap
				[(tile_origin.x + x + (tile_origin.y + y) * bitmap_size.x) as usize];
			if cell != 0 {
				counts[x as usize + yoff] = 1 + if y > 0 {
					counts[x as usize + yoff - TILE_RESOLUTION]
				} else {
					0
				};
				pixels += 1;
			} else {
				counts[x as usize + yoff] = 0;
			}
		}

		let mut prev = size.x;
		for x in (0..size.x).rev() {
			if counts[x as usize + yoff] != 0 {
				prev = x;
			}
			skips[x as usize + yoff] = 1.max(prev - x) as i16;
		}
	}

	while pixels > 0 {
		let best = find_best_rect(&counts, &skips, size);

		// clear the winner's run-lengths and jump the skip lists over it
		for y in best.min.y..best.max.y {
			let yoff = (y * TILE_RESOLUTION as i32) as usize;
			for x in best.min.x..best.max.x {
				counts[x as usize + yoff] = 0;
			}
			let mut next = best.max.x;
			if next < size.x && counts[next as usize + yoff] == 0 {
				next += skips[next as usize + yoff] as i32;
			}
			for x in best.min.x..best.max.x {
				skips[x as usize + yoff] = (next - x) as i16;
			}
		}

		// run-lengths below the removed rows cascade from the cleared cells
		for x in best.min.x..best.max.x {
			for y in best.max.y..size.y {
				let offset = (x + y * TILE_RESOLUTION as i32) as usize;
				counts[offset] = if counts[offset] != 0 {
					counts[offset - TILE_RESOLUTION] + 1
				} else {
					0
				};
				if counts[offset] == 0 {
					break;
				}
			}
		}

		out.push(GridRect::new(best.min + tile_origin, best.max + tile_origin));
		pixels -= best.width() * best.height();
	}
}
