//! `use bevy_navquad_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navmesh::{
	geometry::*, height_field::*, mesh::*, partition::*, search::*, *,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	plugin::{build_layer::*, path_layer::*, *},
};
