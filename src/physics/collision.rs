//! Colliders and contact flags.

use bevy::prelude::*;

/// Which sides of a body touched something during the last move.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CollisionState {
    pub below: bool,
    pub above: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_collision(&self) -> bool {
        self.below || self.above || self.left || self.right
    }
}

/// Axis-aligned box around a body, centred on its level position plus `offset`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BoxCollider {
    pub offset: Vec2,
    pub size: Vec2,
}

impl BoxCollider {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    /// Level-space bounds when the owner sits at `position`.
    pub fn bounds(&self, position: Vec2) -> Rect {
        Rect::from_center_size(position + self.offset, self.size)
    }
}

/// Level-space position of a simulated body (Y down).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LevelPosition(pub Vec2);

/// Velocity in level pixels per second (Y down: positive is falling).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec2);

/// How a bullet box has to relate to an enemy box to count as a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum HitTest {
    /// Boxes overlap with positive area
    #[default]
    Intersects,
    /// The first box fully encloses the second
    Contains,
}

impl HitTest {
    pub fn test(self, a: Rect, b: Rect) -> bool {
        match self {
            Self::Intersects => intersects(a, b),
            Self::Contains => contains(a, b),
        }
    }
}

/// Overlap with positive area. Touching edges do not count.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// `outer` fully encloses `inner`.
pub fn contains(outer: Rect, inner: Rect) -> bool {
    outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && outer.max.x >= inner.max.x
        && outer.max.y >= inner.max.y
}

/// Point-in-polygon by ray casting. Points on an edge may go either way.
pub fn polygon_contains(polygon: &[Vec2], point: Vec2) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = (p2 - p1).perp_dot(q1 - p1);
    let d2 = (p2 - p1).perp_dot(q2 - p1);
    let d3 = (q2 - q1).perp_dot(p1 - q1);
    let d4 = (q2 - q1).perp_dot(p2 - q1);
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0) && d1 != 0.0 && d2 != 0.0
}

/// Whether a box overlaps a closed polygon (level space).
pub fn rect_polygon_overlap(rect: Rect, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let corners = [
        rect.min,
        Vec2::new(rect.max.x, rect.min.y),
        rect.max,
        Vec2::new(rect.min.x, rect.max.y),
    ];

    if polygon
        .iter()
        .any(|p| p.x > rect.min.x && p.x < rect.max.x && p.y > rect.min.y && p.y < rect.max.y)
    {
        return true;
    }
    if corners.iter().any(|c| polygon_contains(polygon, *c)) {
        return true;
    }

    let edges = polygon.iter().zip(polygon.iter().cycle().skip(1));
    for (a, b) in edges {
        for k in 0..4 {
            if segments_cross(*a, *b, corners[k], corners[(k + 1) % 4]) {
                return true;
            }
        }
    }
    false
}
