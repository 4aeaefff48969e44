//! A navigation mesh is built from the stacked box geometry of a level and
//! used by actors to move across it.
//!
//! The level supplies two lists of integer axis-aligned boxes: `walkable`
//! boxes whose tops can be stood on and `blocker` boxes which forbid standing.
//! From these a [height_field::HeightField] derives, per `(x, z)` grid cell,
//! a short ordered list of discrete vertical levels (floor height plus
//! headroom). Each level's walkable footprint is then partitioned into a
//! small set of non-overlapping rectangles ("quads"):
//!
//! ```text
//!  _________________________
//! |         |       |       |
//! |         |   B   |   C   |
//! |    A    |_______|_______|
//! |         |               |
//! |_________|       D       |
//! |    E    |_______________|
//! |_________|___F___|
//! ```
//!
//! Quads that share a boundary segment and sit within one height unit of each
//! other are connected into an adjacency graph owned by a
//! [mesh::NavQuadMesh]. Temporary obstructions (moving entities, doors) are
//! applied by splitting the overlapped quads into up to four residual
//! sub-quads and are fully undone by a single restore call, without ever
//! rebuilding the whole mesh.
//!
//! Path queries run a heap-based search over the quad graph which tracks the
//! exact boundary-crossing point between consecutive quads rather than quad
//! centres, then straightens the result with a shortcut-refinement pass and
//! emits world waypoints an actor's locomotion controller can follow.
//!
//! Definitions:
//!
//! * Level - one discrete vertical floor/height band at a grid cell
//! * Quad - a maximal axis-aligned rectangle of uniformly walkable cells at
//!   one level
//! * Collider - a temporary obstacle box that locally subdivides the mesh
//! * Entry point - the exact boundary-crossing coordinate used when moving
//!   between two adjacent quads
//! * Octile distance - grid metric allowing 8-directional movement with a
//!   diagonal cost of `√2`
//!

pub mod geometry;
pub mod height_field;
pub mod mesh;
pub mod partition;
pub mod search;
