//! This is a plugin for Bevy game engine to build quad-based 2.5D navigation
//! meshes from stacked box geometry and answer point-to-point path queries
//!

pub mod bundle;
pub mod navmesh;
pub mod plugin;

pub mod prelude;
