//! Tiled layer components.

use bevy::prelude::*;

/// Kind of a Tiled layer entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum TiledLayer {
    Tiles,
    Objects,
    Image,
    Group,
}

/// Layer ID from Tiled.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct LayerId(pub u32);

/// Layer name as set in the editor.
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct LayerName(pub String);
