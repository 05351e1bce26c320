//! Gizmo overlay for colliders, level bounds, triggers and solid cells.

use bevy::prelude::*;
use fortloop_core::prelude::*;

use crate::physics::{BoxCollider, LevelCollision, LevelPosition, Trigger, TriggerShape};

pub const COLLIDERS_KEY: KeyCode = KeyCode::F1;
pub const LEVEL_BOUNDS_KEY: KeyCode = KeyCode::F2;
pub const TRIGGERS_KEY: KeyCode = KeyCode::F3;

const COLLIDER_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);
const TRIGGER_COLOR: Color = Color::srgb(1.0, 0.8, 0.0);
const SOLID_COLOR: Color = Color::srgba(1.0, 0.2, 0.2, 0.6);

/// Which overlays are drawn.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugToggles {
    pub colliders: bool,
    pub level_bounds: bool,
    pub triggers: bool,
}

impl DebugToggles {
    /// Flip every overlay whose key went down this frame.
    pub fn apply(&mut self, just_pressed: impl Fn(KeyCode) -> bool) {
        if just_pressed(COLLIDERS_KEY) {
            self.colliders = !self.colliders;
        }
        if just_pressed(LEVEL_BOUNDS_KEY) {
            self.level_bounds = !self.level_bounds;
        }
        if just_pressed(TRIGGERS_KEY) {
            self.triggers = !self.triggers;
        }
    }
}

/// Level bounds are drawn by the core crate while its resource exists.
pub fn toggle_debug_overlays(
    keys: Res<ButtonInput<KeyCode>>,
    mut toggles: ResMut<DebugToggles>,
    bounds: Option<Res<DebugLevelGeometry>>,
    mut commands: Commands,
) {
    let before = *toggles;
    toggles.apply(|key| keys.just_pressed(key));
    if *toggles == before {
        return;
    }
    debug!("Debug overlays: {:?}", *toggles);

    match (toggles.level_bounds, bounds.is_some()) {
        (true, false) => commands.insert_resource(DebugLevelGeometry::default()),
        (false, true) => commands.remove_resource::<DebugLevelGeometry>(),
        _ => {}
    }
}

fn draw_rect(gizmos: &mut Gizmos, rect: Rect, color: Color) {
    let render = level_rect_to_render(rect);
    gizmos.rect_2d(
        Isometry2d::from_translation(render.center()),
        render.size(),
        color,
    );
}

pub fn draw_debug_overlays(
    toggles: Res<DebugToggles>,
    bodies: Query<(&LevelPosition, &BoxCollider)>,
    triggers: Query<(&LevelPosition, &Trigger)>,
    collision: Option<Res<LevelCollision>>,
    mut gizmos: Gizmos,
) {
    if toggles.colliders {
        for (position, collider) in &bodies {
            draw_rect(&mut gizmos, collider.bounds(position.0), COLLIDER_COLOR);
        }
    }

    if !toggles.triggers {
        return;
    }
    for (position, trigger) in &triggers {
        match &trigger.shape {
            TriggerShape::Box { size } => {
                let rect = Rect::from_center_size(position.0, *size);
                draw_rect(&mut gizmos, rect, TRIGGER_COLOR);
            }
            TriggerShape::Polygon { vertices } => {
                let points = vertices
                    .iter()
                    .chain(vertices.first())
                    .map(|vertex| level_to_render(position.0 + *vertex));
                gizmos.linestrip_2d(points, TRIGGER_COLOR);
            }
        }
    }
    if let Some(collision) = collision {
        for grid in &collision.grids {
            for cell in grid.solid_cells() {
                draw_rect(&mut gizmos, cell, SOLID_COLOR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_toggle_on_press() {
        let mut toggles = DebugToggles::default();
        toggles.apply(|key| key == KeyCode::F1 || key == KeyCode::F3);
        assert_eq!(
            toggles,
            DebugToggles {
                colliders: true,
                level_bounds: false,
                triggers: true,
            }
        );

        toggles.apply(|key| key == KeyCode::F1);
        assert!(!toggles.colliders);
        assert!(toggles.triggers);
    }

    #[test]
    fn test_level_bounds_resource_follows_toggle() {
        let mut world = World::new();
        world.init_resource::<DebugToggles>();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::F2);
        world.insert_resource(keys);

        let mut schedule = Schedule::default();
        schedule.add_systems(toggle_debug_overlays);
        schedule.run(&mut world);
        assert!(world.contains_resource::<DebugLevelGeometry>());

        // Pressing again on a later frame removes it.
        let mut keys = world.resource_mut::<ButtonInput<KeyCode>>();
        keys.clear();
        keys.release(KeyCode::F2);
        keys.press(KeyCode::F2);
        schedule.run(&mut world);
        assert!(!world.contains_resource::<DebugLevelGeometry>());
    }
}
