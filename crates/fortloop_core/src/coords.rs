//! Level space to render space conversion.
//!
//! Level data (Tiled and LDtk) uses pixel coordinates with the origin at the
//! top-left and Y pointing down. Bevy renders with Y pointing up. Everything
//! spawned by this crate keeps its level-space position in a component and
//! gets a render-space `Transform` of `(x, -y)`.

use bevy::math::{Rect, Vec2};

/// Convert a level-space point to render space.
#[inline]
pub fn level_to_render(point: Vec2) -> Vec2 {
    Vec2::new(point.x, -point.y)
}

/// Convert a render-space point to level space.
#[inline]
pub fn render_to_level(point: Vec2) -> Vec2 {
    Vec2::new(point.x, -point.y)
}

/// Convert a level-space rectangle to render space.
pub fn level_rect_to_render(rect: Rect) -> Rect {
    Rect::from_corners(level_to_render(rect.min), level_to_render(rect.max))
}
