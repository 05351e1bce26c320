//! Map components and level geometry.

use bevy::prelude::*;
use fortloop_assets::prelude::TiledMapAsset;

/// Marker component for scene roots (Tiled maps and LDtk worlds).
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct LevelSceneRoot;

/// Root component for a Tiled map.
///
/// Spawn an entity with this component to trigger map loading and entity hierarchy creation.
///
/// # Example
///
/// ```rust,no_run
/// # use bevy::prelude::*;
/// # use fortloop_core::prelude::TiledMap;
/// fn spawn_map(mut commands: Commands, asset_server: Res<AssetServer>) {
///     commands.spawn(TiledMap {
///         handle: asset_server.load("platformer/tiledMap.tmx"),
///     });
/// }
/// ```
#[derive(Component, Reflect)]
#[reflect(Component)]
#[require(Transform, Visibility, LevelSceneRoot)]
pub struct TiledMap {
    /// Handle to the loaded `TiledMapAsset`.
    pub handle: Handle<TiledMapAsset>,
}

/// Layer entities belonging to a map, in file order.
#[derive(Component, Default, Debug, Reflect)]
#[reflect(Component)]
pub struct LayersInMap(pub Vec<Entity>);

/// Level-space geometry of a Tiled map or an LDtk level.
///
/// # Coordinate System
///
/// - Origin (0, 0) is the top-left corner of the map (for LDtk levels, of the world)
/// - X increases rightward
/// - Y increases downward
///
/// Use [`crate::coords::level_to_render`] to place things on screen.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LevelGeometry {
    /// Dimensions in cells
    pub size: UVec2,
    /// Cell dimensions in pixels
    pub tile_size: Vec2,
    /// Level-space bounding rectangle.
    pub bounds: Rect,
}

impl LevelGeometry {
    /// Geometry of a grid starting at the level origin.
    pub fn new(width: u32, height: u32, tile_width: f32, tile_height: f32) -> Self {
        Self::at(Vec2::ZERO, width, height, tile_width, tile_height)
    }

    /// Geometry of a grid whose top-left corner is `origin`.
    pub fn at(origin: Vec2, width: u32, height: u32, tile_width: f32, tile_height: f32) -> Self {
        Self {
            size: UVec2::new(width, height),
            tile_size: Vec2::new(tile_width, tile_height),
            bounds: Rect {
                min: origin,
                max: origin + Vec2::new(width as f32 * tile_width, height as f32 * tile_height),
            },
        }
    }

    /// Whether `point` lies inside the bounds. The right and bottom edges are exclusive.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.bounds.min.x
            && point.y >= self.bounds.min.y
            && point.x < self.bounds.max.x
            && point.y < self.bounds.max.y
    }

    /// Level-space center of the cell at `tile`.
    pub fn tile_to_level(&self, tile: UVec2) -> Vec2 {
        self.bounds.min + (tile.as_vec2() + Vec2::splat(0.5)) * self.tile_size
    }

    /// Cell containing the level-space `point`, if inside the bounds.
    pub fn level_to_tile(&self, point: Vec2) -> Option<UVec2> {
        if !self.contains(point) {
            return None;
        }
        let cell = ((point - self.bounds.min) / self.tile_size).floor();
        Some(cell.as_uvec2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_bounds() {
        let geometry = LevelGeometry::new(10, 5, 16.0, 16.0);
        assert_eq!(geometry.bounds.min, Vec2::ZERO);
        assert_eq!(geometry.bounds.max, Vec2::new(160.0, 80.0));
    }

    #[test]
    fn test_contains_is_half_open() {
        let geometry = LevelGeometry::at(Vec2::new(256.0, 0.0), 16, 8, 16.0, 16.0);
        assert!(geometry.contains(Vec2::new(256.0, 0.0)));
        assert!(!geometry.contains(Vec2::new(512.0, 0.0)));
        assert!(!geometry.contains(Vec2::new(300.0, 128.0)));
    }

    #[test]
    fn test_tile_conversion() {
        let geometry = LevelGeometry::new(10, 5, 16.0, 16.0);
        assert_eq!(geometry.tile_to_level(UVec2::new(0, 0)), Vec2::new(8.0, 8.0));
        assert_eq!(geometry.tile_to_level(UVec2::new(2, 1)), Vec2::new(40.0, 24.0));
        assert_eq!(geometry.level_to_tile(Vec2::new(40.0, 24.0)), Some(UVec2::new(2, 1)));
        assert_eq!(geometry.level_to_tile(Vec2::new(-1.0, 0.0)), None);
    }
}
