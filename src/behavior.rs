//! Per-entity behaviors driven by an exclusive system.
//!
//! A [`Behavior`] owns the state of one gameplay role (a player, a pickup)
//! and gets full world access while it runs. The [`BehaviorRegistry`] keeps
//! them in attach order, runs them once per frame and detaches everything
//! attached to an entity once that entity is gone.

use bevy::prelude::*;

/// Gameplay logic attached to a single entity.
pub trait Behavior: Send + Sync + 'static {
    /// Runs once, as soon as the behavior is attached.
    fn on_attach(&mut self, _ctx: &mut BehaviorContext) {}

    /// Runs once per frame.
    fn on_update(&mut self, ctx: &mut BehaviorContext);

    /// Runs once, when the behavior is detached or its entity no longer exists.
    fn on_detach(&mut self, _ctx: &mut BehaviorContext) {}
}

/// World access handed to a running behavior.
pub struct BehaviorContext<'a> {
    pub world: &'a mut World,
    /// The entity the behavior is attached to
    pub entity: Entity,
    pending: &'a mut Vec<(Entity, Box<dyn Behavior>)>,
}

impl BehaviorContext<'_> {
    /// Attach a behavior once the current pass is over.
    pub fn attach(&mut self, entity: Entity, behavior: impl Behavior) {
        self.pending.push((entity, Box::new(behavior)));
    }

    pub fn delta_secs(&self) -> f32 {
        self.world
            .get_resource::<Time>()
            .map_or(0.0, |time| time.delta_secs())
    }

    /// Whether the entity still exists.
    pub fn is_alive(&self) -> bool {
        self.world.get_entity(self.entity).is_ok()
    }
}

struct BehaviorEntry {
    entity: Entity,
    behaviors: Vec<Box<dyn Behavior>>,
}

/// Every attached behavior, grouped by entity in attach order.
#[derive(Resource, Default)]
pub struct BehaviorRegistry {
    entries: Vec<BehaviorEntry>,
}

impl BehaviorRegistry {
    /// Attach `behavior` to `entity` and run its `on_attach` right away.
    pub fn attach(world: &mut World, entity: Entity, behavior: impl Behavior) {
        world.init_resource::<Self>();
        world.resource_scope(|world, mut registry: Mut<Self>| {
            registry.attach_all(world, vec![(entity, Box::new(behavior) as Box<dyn Behavior>)]);
        });
    }

    /// Detach every behavior from `entity`, running `on_detach` in attach order.
    pub fn detach(world: &mut World, entity: Entity) {
        if !world.contains_resource::<Self>() {
            return;
        }
        world.resource_scope(|world, mut registry: Mut<Self>| registry.detach_all(world, entity));
    }

    /// Number of behaviors attached to `entity`.
    pub fn count(&self, entity: Entity) -> usize {
        self.entries
            .iter()
            .find(|entry| entry.entity == entity)
            .map_or(0, |entry| entry.behaviors.len())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One frame: reap dead entities, update everything, then apply
    /// attachments requested during the pass.
    pub fn run(&mut self, world: &mut World) {
        let dead: Vec<Entity> = self
            .entries
            .iter()
            .map(|entry| entry.entity)
            .filter(|entity| world.get_entity(*entity).is_err())
            .collect();
        for entity in dead {
            debug!("Detaching behaviors from despawned {}", entity);
            self.detach_all(world, entity);
        }

        let mut pending = Vec::new();
        for entry in &mut self.entries {
            for behavior in &mut entry.behaviors {
                // An earlier behavior may have despawned the entity
                if world.get_entity(entry.entity).is_err() {
                    break;
                }
                let mut ctx = BehaviorContext {
                    world: &mut *world,
                    entity: entry.entity,
                    pending: &mut pending,
                };
                behavior.on_update(&mut ctx);
            }
        }

        self.attach_all(world, pending);
    }

    fn attach_all(&mut self, world: &mut World, mut queue: Vec<(Entity, Box<dyn Behavior>)>) {
        while !queue.is_empty() {
            let mut pending = Vec::new();
            for (entity, mut behavior) in queue.drain(..) {
                if world.get_entity(entity).is_err() {
                    warn!("Cannot attach a behavior to despawned {}", entity);
                    continue;
                }
                let mut ctx = BehaviorContext {
                    world: &mut *world,
                    entity,
                    pending: &mut pending,
                };
                behavior.on_attach(&mut ctx);
                self.entry_mut(entity).behaviors.push(behavior);
            }
            queue = pending;
        }
    }

    fn detach_all(&mut self, world: &mut World, entity: Entity) {
        let Some(index) = self.entries.iter().position(|entry| entry.entity == entity) else {
            return;
        };
        let entry = self.entries.remove(index);

        let mut pending = Vec::new();
        for mut behavior in entry.behaviors {
            let mut ctx = BehaviorContext {
                world: &mut *world,
                entity,
                pending: &mut pending,
            };
            behavior.on_detach(&mut ctx);
        }
        self.attach_all(world, pending);
    }

    fn entry_mut(&mut self, entity: Entity) -> &mut BehaviorEntry {
        let index = match self.entries.iter().position(|entry| entry.entity == entity) {
            Some(index) => index,
            None => {
                self.entries.push(BehaviorEntry {
                    entity,
                    behaviors: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }
}

/// Runs every attached behavior.
pub fn run_behaviors(world: &mut World) {
    world.resource_scope(|world, mut registry: Mut<BehaviorRegistry>| registry.run(world));
}

/// Attach behaviors through `Commands`.
pub trait AttachBehaviorExt {
    fn attach_behavior(&mut self, behavior: impl Behavior) -> &mut Self;
}

impl AttachBehaviorExt for EntityCommands<'_> {
    fn attach_behavior(&mut self, behavior: impl Behavior) -> &mut Self {
        let entity = self.id();
        self.commands()
            .queue(move |world: &mut World| BehaviorRegistry::attach(world, entity, behavior));
        self
    }
}
