//! Scene cameras.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use fortloop_core::prelude::*;

use crate::physics::LevelPosition;

/// Design resolution of the platformer scene.
pub const PLATFORMER_RESOLUTION: UVec2 = UVec2::new(640, 480);

/// Height in level pixels the shooter scene is drawn at.
pub const SHOOTER_VIEW_HEIGHT: u32 = 180;

/// Level-space Y the shooter camera stays at.
pub const SHOOTER_CAMERA_Y: f32 = 120.0;

/// Marks the entity the shooter camera follows.
#[derive(Component, Debug, Default)]
pub struct CameraTarget;

/// Largest whole-number zoom at which `design` still fits in `window`.
///
/// Returns the projection scale, never zooming out below 1:1.
pub fn pixel_perfect_scale(window: UVec2, design: UVec2) -> f32 {
    let fit_x = window.x / design.x.max(1);
    let fit_y = window.y / design.y.max(1);
    1.0 / fit_x.min(fit_y).max(1) as f32
}

/// Zoom the shooter view so `SHOOTER_VIEW_HEIGHT` pixels fill the window.
pub fn shooter_scale(window_height: u32) -> f32 {
    1.0 / (window_height / SHOOTER_VIEW_HEIGHT).max(1) as f32
}

fn primary_size(windows: &Query<&Window, With<PrimaryWindow>>) -> Option<UVec2> {
    windows.single().ok().map(Window::physical_size)
}

/// Centres the camera on the Tiled map and keeps the zoom pixel perfect.
pub fn fit_platformer_camera(
    maps: Query<&LevelGeometry, With<TiledMap>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
) {
    let (Some(geometry), Some(size)) = (maps.iter().next(), primary_size(&windows)) else {
        return;
    };
    let center = level_to_render(geometry.bounds.center());
    let scale = pixel_perfect_scale(size, PLATFORMER_RESOLUTION);

    for (mut transform, mut projection) in &mut cameras {
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        if let Projection::Orthographic(ortho) = &mut *projection
            && ortho.scale != scale
        {
            ortho.scale = scale;
        }
    }
}

/// Follows the target's X at a fixed height.
pub fn follow_camera_target(
    targets: Query<&LevelPosition, With<CameraTarget>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
) {
    let Some(target) = targets.iter().next() else {
        return;
    };
    let focus = level_to_render(Vec2::new(target.0.x, SHOOTER_CAMERA_Y));
    let scale = primary_size(&windows).map(|size| shooter_scale(size.y));

    for (mut transform, mut projection) in &mut cameras {
        transform.translation.x = focus.x;
        transform.translation.y = focus.y;
        if let Some(scale) = scale
            && let Projection::Orthographic(ortho) = &mut *projection
            && ortho.scale != scale
        {
            ortho.scale = scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_perfect_scale() {
        assert_eq!(pixel_perfect_scale(UVec2::new(640, 480), PLATFORMER_RESOLUTION), 1.0);
        assert_eq!(pixel_perfect_scale(UVec2::new(1920, 1080), PLATFORMER_RESOLUTION), 0.5);
        // Smaller than the design size stays at 1:1
        assert_eq!(pixel_perfect_scale(UVec2::new(320, 240), PLATFORMER_RESOLUTION), 1.0);
    }

    #[test]
    fn test_shooter_scale_uses_whole_zoom_steps() {
        assert_eq!(shooter_scale(720), 0.25);
        assert_eq!(shooter_scale(600), 1.0 / 3.0);
        assert_eq!(shooter_scale(100), 1.0);
    }
}
