//! Trigger colliders and enter/exit tracking.
//!
//! Movement against tile grids never touches trigger colliders, so bodies
//! that care about triggers test their box after each move and feed the
//! overlapping set into their [`TriggerTracker`].

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::collision::{intersects, rect_polygon_overlap};

/// Shape of a trigger, relative to the trigger's level position.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum TriggerShape {
    /// Box centred on the position
    Box { size: Vec2 },
    /// Closed polygon, vertices relative to the position
    Polygon { vertices: Vec<Vec2> },
}

/// A collider that reports overlaps instead of blocking movement.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Trigger {
    pub shape: TriggerShape,
}

impl Trigger {
    pub fn with_box(width: f32, height: f32) -> Self {
        Self {
            shape: TriggerShape::Box {
                size: Vec2::new(width, height),
            },
        }
    }

    pub fn with_polygon(vertices: Vec<Vec2>) -> Self {
        Self {
            shape: TriggerShape::Polygon { vertices },
        }
    }

    /// Whether a body box overlaps this trigger placed at `position`.
    pub fn overlaps(&self, position: Vec2, bounds: Rect) -> bool {
        match &self.shape {
            TriggerShape::Box { size } => intersects(Rect::from_center_size(position, *size), bounds),
            TriggerShape::Polygon { vertices } => {
                let local = Rect {
                    min: bounds.min - position,
                    max: bounds.max - position,
                };
                rect_polygon_overlap(local, vertices)
            }
        }
    }
}

/// A body started overlapping a trigger.
#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerEntered {
    pub body: Entity,
    pub trigger: Entity,
}

/// A body stopped overlapping a trigger.
#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerExited {
    pub body: Entity,
    pub trigger: Entity,
}

/// Triggers a body overlapped after its last move.
#[derive(Component, Debug, Clone, Default)]
pub struct TriggerTracker {
    active: HashSet<Entity>,
}

/// Edges produced by one [`TriggerTracker::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerChanges {
    pub entered: Vec<Entity>,
    pub exited: Vec<Entity>,
}

impl TriggerChanges {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

impl TriggerTracker {
    /// Replace the overlapping set, reporting triggers entered and left.
    ///
    /// `entered` keeps the order of `overlapping`.
    pub fn update(&mut self, overlapping: &[Entity]) -> TriggerChanges {
        let current: HashSet<Entity> = overlapping.iter().copied().collect();
        let entered = overlapping
            .iter()
            .copied()
            .filter(|entity| !self.active.contains(entity))
            .collect();
        let mut exited: Vec<Entity> = self
            .active
            .iter()
            .copied()
            .filter(|entity| !current.contains(entity))
            .collect();
        exited.sort();
        self.active = current;
        TriggerChanges { entered, exited }
    }

    pub fn is_inside(&self, trigger: Entity) -> bool {
        self.active.contains(&trigger)
    }

    /// Forget a trigger without reporting an exit, e.g. once it is despawned.
    pub fn forget(&mut self, trigger: Entity) {
        self.active.remove(&trigger);
    }
}

/// Every trigger in `world` overlapping `bounds`, sorted by entity.
pub fn overlapping_triggers(world: &mut World, bounds: Rect) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &Trigger, &super::collision::LevelPosition)>();
    let mut hits: Vec<Entity> = query
        .iter(world)
        .filter(|(_, trigger, position)| trigger.overlaps(position.0, bounds))
        .map(|(entity, _, _)| entity)
        .collect();
    hits.sort();
    hits
}
