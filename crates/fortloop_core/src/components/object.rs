//! Tiled object components.

use bevy::prelude::*;

/// Shape of a Tiled object, with vertices relative to the object position
/// in level space (Y down).
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum TiledObject {
    Point,
    Rectangle { width: f32, height: f32 },
    Ellipse { width: f32, height: f32 },
    Polygon { vertices: Vec<Vec2> },
    Polyline { vertices: Vec<Vec2> },
    Text,
}

/// Identity and level-space placement of a Tiled object.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ObjectInfo {
    /// Object ID from Tiled
    pub id: u32,
    pub name: String,
    /// Class (formerly "type") set in the editor
    pub class: String,
    /// Name of the object layer the object belongs to
    pub group: String,
    /// Level-space position, including the layer offset
    pub position: Vec2,
}
