//! Level-space physics: colliders, swept movement and triggers.

pub mod collision;
pub mod mover;
pub mod trigger;

use bevy::prelude::*;

pub use collision::{BoxCollider, CollisionState, HitTest, LevelPosition, Velocity};
pub use mover::{Mover, SolidGrid, TileGridMover};
pub use trigger::{
    Trigger, TriggerChanges, TriggerEntered, TriggerExited, TriggerShape, TriggerTracker,
    overlapping_triggers,
};

/// Solid geometry of the running scene.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelCollision {
    pub grids: Vec<SolidGrid>,
}

impl LevelCollision {
    pub fn mover(&self) -> TileGridMover<'_> {
        TileGridMover::new(&self.grids)
    }
}
