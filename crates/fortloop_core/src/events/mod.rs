//! Spawn events for Layer 3 extension hooks.
//!
//! The game observes these to attach rendering, collision and gameplay
//! components to the entities this crate spawns.

use bevy::prelude::*;

/// Fired when a Tiled object entity is spawned.
///
/// # Example
///
/// ```ignore
/// app.add_observer(|trigger: On<ObjectSpawned>, mut commands: Commands| {
///     let event = trigger.event();
///     if event.group == "collectibles" {
///         commands.entity(event.entity).insert(Collectible);
///     }
/// });
/// ```
#[derive(Event, Debug, Clone)]
pub struct ObjectSpawned {
    /// The spawned object entity
    pub entity: Entity,
    /// The parent map entity
    pub map_entity: Entity,
    /// The object's ID from Tiled
    pub object_id: u32,
    /// Object name
    pub name: String,
    /// Name of the object layer
    pub group: String,
}

/// Fired when a Tiled tile layer is spawned.
#[derive(Event, Debug, Clone)]
pub struct TileLayerSpawned {
    /// The spawned layer entity
    pub entity: Entity,
    /// The parent map entity
    pub map_entity: Entity,
    /// The layer's ID from Tiled
    pub layer_id: u32,
    pub name: String,
}

/// Fired when a Tiled object layer is spawned.
#[derive(Event, Debug, Clone)]
pub struct ObjectLayerSpawned {
    /// The spawned layer entity
    pub entity: Entity,
    /// The parent map entity
    pub map_entity: Entity,
    /// The layer's ID from Tiled
    pub layer_id: u32,
    pub name: String,
}

/// Fired when a map's entity hierarchy is fully spawned.
///
/// This is an `EntityEvent` that can be observed on the map entity.
///
/// # Example
///
/// ```ignore
/// commands.spawn(TiledMap { ... })
///     .observe(|trigger: On<MapSpawned>| {
///         info!("Map fully loaded: {:?}", trigger.event().entity);
///     });
/// ```
#[derive(EntityEvent, Debug, Clone)]
pub struct MapSpawned {
    /// The map entity
    #[event_target]
    pub entity: Entity,
}

/// Fired when an LDtk IntGrid layer is spawned with its `IntGridData`.
#[derive(Event, Debug, Clone)]
pub struct IntGridLayerSpawned {
    /// The spawned layer entity
    pub entity: Entity,
    /// The parent level entity
    pub level_entity: Entity,
    pub identifier: String,
}

/// Fired when an LDtk layer with drawable tiles is spawned with its
/// `LdtkTileLayerData`.
#[derive(Event, Debug, Clone)]
pub struct LdtkTileLayerSpawned {
    /// The spawned layer entity
    pub entity: Entity,
    /// The parent level entity
    pub level_entity: Entity,
    pub identifier: String,
    pub tileset_uid: i64,
}

/// Fired when an LDtk entity instance is spawned with its `LdtkEntity`.
#[derive(Event, Debug, Clone)]
pub struct LdtkEntitySpawned {
    /// The spawned entity
    pub entity: Entity,
    /// The world root entity
    pub world_entity: Entity,
    pub identifier: String,
    pub iid: String,
}

/// Fired when every level of an LDtk world has been spawned.
///
/// This is an `EntityEvent` that can be observed on the world entity.
#[derive(EntityEvent, Debug, Clone)]
pub struct LdtkWorldSpawned {
    /// The world entity
    #[event_target]
    pub entity: Entity,
}
