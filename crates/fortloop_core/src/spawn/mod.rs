//! Entity spawning for loaded level assets.

mod ldtk;
mod map;

pub use ldtk::spawn_ldtk_world;
pub use map::{build_tile_layer_data, spawn_map};
