//! Debug visualization for level geometry.

use bevy::prelude::*;

use crate::components::map::LevelGeometry;
use crate::coords::level_rect_to_render;

/// Resource to enable level geometry debug visualization.
///
/// Insert this resource to draw a rectangle around each map or level.
///
/// # Example
///
/// ```rust,no_run
/// # use bevy::prelude::*;
/// # use fortloop_core::debug::DebugLevelGeometry;
/// fn enable_debug(mut commands: Commands) {
///     commands.insert_resource(DebugLevelGeometry::default());
/// }
/// ```
#[derive(Resource, Debug, Clone)]
pub struct DebugLevelGeometry {
    /// Color for the bounds rectangle
    pub bounds_color: Color,
}

impl Default for DebugLevelGeometry {
    fn default() -> Self {
        Self {
            bounds_color: Color::srgba(0.0, 1.0, 0.0, 0.8), // Green
        }
    }
}

/// Draws the bounds of every `LevelGeometry`.
///
/// Bounds are level space; they are drawn relative to the scene root, which
/// is expected at the origin.
pub fn draw_level_geometry_debug(
    config: Res<DebugLevelGeometry>,
    geometry_query: Query<&LevelGeometry>,
    mut gizmos: Gizmos,
) {
    for geometry in &geometry_query {
        let bounds = level_rect_to_render(geometry.bounds);

        gizmos.rect_2d(
            Isometry2d::from_translation(bounds.center()),
            bounds.size(),
            config.bounds_color,
        );

        let corner_size = geometry.tile_size.min_element() * 0.5;
        let corners = [
            bounds.min,
            Vec2::new(bounds.max.x, bounds.min.y),
            bounds.max,
            Vec2::new(bounds.min.x, bounds.max.y),
        ];
        for corner in corners {
            gizmos.circle_2d(
                Isometry2d::from_translation(corner),
                corner_size,
                config.bounds_color,
            );
        }
    }
}
