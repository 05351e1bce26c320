//! LDtk world, level, layer and entity components.

use bevy::prelude::*;
use fortloop_assets::ldtk::{LayerType, TileRect};
use fortloop_assets::prelude::LdtkProjectAsset;

use super::map::LevelSceneRoot;

/// Root component for one world of an LDtk project.
///
/// ```rust,no_run
/// # use bevy::prelude::*;
/// # use fortloop_core::prelude::LdtkWorld;
/// fn spawn_world(mut commands: Commands, asset_server: Res<AssetServer>) {
///     commands.spawn(LdtkWorld::new(asset_server.load("fortloop/world.ldtk"), "World"));
/// }
/// ```
#[derive(Component, Reflect)]
#[reflect(Component)]
#[require(Transform, Visibility, LevelSceneRoot)]
pub struct LdtkWorld {
    /// Handle to the loaded `LdtkProjectAsset`.
    pub handle: Handle<LdtkProjectAsset>,
    /// World iid or identifier
    pub world: String,
}

impl LdtkWorld {
    pub fn new(handle: Handle<LdtkProjectAsset>, world: impl Into<String>) -> Self {
        Self {
            handle,
            world: world.into(),
        }
    }
}

/// Level entities belonging to a world, in file order.
#[derive(Component, Default, Debug, Reflect)]
#[reflect(Component)]
pub struct LevelsInWorld(pub Vec<Entity>);

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LdtkLevel {
    pub identifier: String,
    pub iid: String,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LdtkLayer {
    pub identifier: String,
    pub level_iid: String,
    #[reflect(ignore)]
    pub layer_type: LayerKind,
}

/// Reflect-friendly copy of the LDtk layer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerKind {
    IntGrid,
    #[default]
    Entities,
    Tiles,
    AutoLayer,
}

impl From<LayerType> for LayerKind {
    fn from(value: LayerType) -> Self {
        match value {
            LayerType::IntGrid => Self::IntGrid,
            LayerType::Entities => Self::Entities,
            LayerType::Tiles => Self::Tiles,
            LayerType::AutoLayer => Self::AutoLayer,
        }
    }
}

/// IntGrid values of a layer, placed in world level space.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct IntGridData {
    pub width: u32,
    pub height: u32,
    pub cell_size: f32,
    /// World-space top-left corner of cell (0, 0)
    pub origin: Vec2,
    /// Row-major values, 0 = empty
    pub values: Vec<i32>,
}

impl IntGridData {
    /// Value at cell `(x, y)`; zero outside the grid.
    pub fn get(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return 0;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Solidity mask for collision: every non-zero value is solid.
    pub fn solid_mask(&self) -> Vec<bool> {
        self.values.iter().map(|value| *value != 0).collect()
    }
}

/// Drawable tiles of an LDtk tile layer, auto-layer or IntGrid layer with rules.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LdtkTileLayerData {
    pub tileset_uid: i64,
    pub grid_size: u32,
    pub tiles: Vec<LdtkTile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct LdtkTile {
    /// Top-left corner in layer pixels (Y down)
    pub position: Vec2,
    /// Index into the tileset atlas
    pub atlas_index: usize,
    pub flip_x: bool,
    pub flip_y: bool,
    pub alpha: f32,
}

/// An LDtk entity instance.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LdtkEntity {
    pub identifier: String,
    pub iid: String,
    pub level_iid: String,
    /// Pivot position in world pixels (Y down)
    pub position: Vec2,
    pub size: Vec2,
    pub pivot: Vec2,
    #[reflect(ignore)]
    pub tile: Option<TileRect>,
}

impl LdtkEntity {
    /// Bounding box in world pixels, derived from the pivot.
    pub fn bounds(&self) -> Rect {
        let min = self.position - self.pivot * self.size;
        Rect::from_corners(min, min + self.size)
    }
}
