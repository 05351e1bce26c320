//! The Tiled platformer scene: the Caveman, collectible items and danger
//! zones on a tile map.

use bevy::prelude::*;
use fortloop_assets::prelude::TiledMapAsset;
use fortloop_core::prelude::*;

use crate::behavior::AttachBehaviorExt;
use crate::caveman::Caveman;
use crate::config::GameConfig;
use crate::physics::{
    BoxCollider, LevelCollision, LevelPosition, SolidGrid, Trigger, TriggerEntered, Velocity,
};
use crate::render::{TilesetLayouts, tiled_layout};

/// Object layer holding the spawn point.
pub const OBJECTS_GROUP: &str = "objects";
pub const SPAWN_OBJECT: &str = "spawn";
pub const COLLECTIBLES_GROUP: &str = "collectibles";
pub const DANGER_ZONE_GROUP: &str = "danger-zone";
/// Tile layer drawn and collided against.
pub const MAIN_LAYER: &str = "main";
/// Tile of the first tileset used for item sprites.
pub const ITEM_TILE: usize = 6;

const CAVEMAN_FRAME: UVec2 = UVec2::splat(32);
const CAVEMAN_COLUMNS: u32 = 8;
const CAVEMAN_ROWS: u32 = 10;
const CAVEMAN_COLLIDER: Vec2 = Vec2::new(16.0, 32.0);
const ITEM_SIZE: f32 = 16.0;
const ACTOR_Z: f32 = 10.0;

#[derive(Component, Debug, Default)]
pub struct Collectible;

/// Sends bodies back to their spawn point.
#[derive(Component, Debug, Default)]
pub struct DangerZone;

/// Where a body respawns.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpawnPoint(pub Vec2);

#[derive(Resource, Debug, Default)]
pub struct ItemsCollected(pub u32);

pub fn setup_platformer(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    commands.spawn(Camera2d);
    commands.spawn((
        TiledMap {
            handle: asset_server.load(config.tiled_map_path.clone()),
        },
        Name::new("Platformer map"),
    ));
    info!("Loading platformer map '{}'", config.tiled_map_path);
}

/// Caveman physics parts, with the collider centred on the spawn point.
fn caveman_body(spawn: Vec2) -> (LevelPosition, Velocity, BoxCollider, SpawnPoint) {
    (
        LevelPosition(spawn),
        Velocity::default(),
        BoxCollider {
            offset: Vec2::ZERO,
            size: CAVEMAN_COLLIDER,
        },
        SpawnPoint(spawn),
    )
}

/// An item trigger box centred on the object's position.
fn collectible(info: &ObjectInfo) -> (Collectible, LevelPosition, Trigger) {
    (
        Collectible,
        LevelPosition(info.position),
        Trigger::with_box(ITEM_SIZE, ITEM_SIZE),
    )
}

/// Polygon outline of an object, relative to its position.
fn object_outline(shape: &TiledObject) -> Option<Vec<Vec2>> {
    match shape {
        TiledObject::Polygon { vertices } => Some(vertices.clone()),
        TiledObject::Rectangle { width, height } => Some(vec![
            Vec2::ZERO,
            Vec2::new(*width, 0.0),
            Vec2::new(*width, *height),
            Vec2::new(0.0, *height),
        ]),
        _ => None,
    }
}

/// Turns map objects into the player, items and danger zones.
pub fn on_platformer_object(
    trigger: On<ObjectSpawned>,
    objects: Query<(&ObjectInfo, &TiledObject)>,
    maps: Query<&TiledMap>,
    map_assets: Res<Assets<TiledMapAsset>>,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
    mut atlas_layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut cache: ResMut<TilesetLayouts>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let Ok((info, shape)) = objects.get(event.entity) else {
        return;
    };

    match event.group.as_str() {
        OBJECTS_GROUP if event.name == SPAWN_OBJECT => {
            let image: Handle<Image> = asset_server.load(config.caveman_atlas_path.clone());
            let layout = cache.get_or_insert(&image, &mut atlas_layouts, || {
                TextureAtlasLayout::from_grid(
                    CAVEMAN_FRAME,
                    CAVEMAN_COLUMNS,
                    CAVEMAN_ROWS,
                    None,
                    None,
                )
            });
            let render = level_to_render(info.position);

            commands
                .spawn((
                    Sprite::from_atlas_image(image, TextureAtlas { layout, index: 0 }),
                    Transform::from_xyz(render.x, render.y, ACTOR_Z),
                    caveman_body(info.position),
                    Name::new("Caveman"),
                ))
                .attach_behavior(Caveman::default());
            info!("Caveman spawned at {}", info.position);
        }
        COLLECTIBLES_GROUP => {
            let mut item = commands.entity(event.entity);
            item.insert(collectible(info));

            let tileset = maps
                .get(event.map_entity)
                .ok()
                .and_then(|map| map_assets.get(&map.handle))
                .and_then(|asset| asset.tilesets.get(&0));
            if let Some(tileset) = tileset {
                let layout = cache.get_or_insert(&tileset.image, &mut atlas_layouts, || {
                    tiled_layout(tileset)
                });
                item.insert(Sprite::from_atlas_image(
                    tileset.image.clone(),
                    TextureAtlas {
                        layout,
                        index: ITEM_TILE,
                    },
                ));
            }
        }
        DANGER_ZONE_GROUP => {
            let Some(outline) = object_outline(shape) else {
                warn!("Danger zone '{}' is not a polygon or rectangle", event.name);
                return;
            };
            commands.entity(event.entity).insert((
                DangerZone,
                LevelPosition(info.position),
                Trigger::with_polygon(outline),
            ));
        }
        _ => {}
    }
}

/// Builds the collision grid from the main tile layer.
pub fn on_platformer_tile_layer(
    trigger: On<TileLayerSpawned>,
    layers: Query<&TileLayerData>,
    maps: Query<&TiledMap>,
    map_assets: Res<Assets<TiledMapAsset>>,
    mut collision: ResMut<LevelCollision>,
) {
    let event = trigger.event();
    if event.name != MAIN_LAYER {
        return;
    }
    let Ok(data) = layers.get(event.entity) else {
        return;
    };
    let Some(asset) = maps
        .get(event.map_entity)
        .ok()
        .and_then(|map| map_assets.get(&map.handle))
    else {
        return;
    };

    collision.grids.push(SolidGrid::new(
        Vec2::ZERO,
        asset.tile_size.as_vec2(),
        data.width,
        data.height,
        data.solid_mask(),
    ));
    info!(
        "Collision grid from layer '{}': {}x{}",
        event.name, data.width, data.height
    );
}

/// Items disappear when touched; danger zones send the body back to spawn.
pub fn on_platformer_trigger(
    trigger: On<TriggerEntered>,
    items: Query<(), With<Collectible>>,
    zones: Query<(), With<DangerZone>>,
    mut bodies: Query<(&mut LevelPosition, &mut Velocity, &SpawnPoint)>,
    mut collected: ResMut<ItemsCollected>,
    mut commands: Commands,
) {
    let event = trigger.event();

    if items.contains(event.trigger) {
        collected.0 += 1;
        commands.entity(event.trigger).despawn();
        info!("Item collected ({} total)", collected.0);
    } else if zones.contains(event.trigger)
        && let Ok((mut position, mut velocity, spawn)) = bodies.get_mut(event.body)
    {
        position.0 = spawn.0;
        velocity.0 = Vec2::ZERO;
        debug!("Danger zone: back to {}", spawn.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::TriggerShape;

    #[test]
    fn test_caveman_collider_centred_on_spawn() {
        let spawn = Vec2::new(48.0, 96.0);
        let (position, _, collider, respawn) = caveman_body(spawn);
        assert_eq!(position.0, spawn);
        assert_eq!(respawn.0, spawn);
        assert_eq!(
            collider.bounds(position.0),
            Rect::from_corners(Vec2::new(40.0, 80.0), Vec2::new(56.0, 112.0))
        );
    }

    #[test]
    fn test_item_trigger_centred_on_object_position() {
        let info = ObjectInfo {
            id: 1,
            name: "coin".into(),
            class: String::new(),
            group: COLLECTIBLES_GROUP.into(),
            position: Vec2::new(32.0, 64.0),
        };
        let (_, position, trigger) = collectible(&info);
        assert_eq!(position.0, Vec2::new(32.0, 64.0));
        assert_eq!(
            trigger.shape,
            TriggerShape::Box {
                size: Vec2::splat(ITEM_SIZE)
            }
        );
    }

    #[test]
    fn test_rectangle_outline() {
        let outline = object_outline(&TiledObject::Rectangle {
            width: 32.0,
            height: 8.0,
        });
        assert_eq!(
            outline,
            Some(vec![
                Vec2::ZERO,
                Vec2::new(32.0, 0.0),
                Vec2::new(32.0, 8.0),
                Vec2::new(0.0, 8.0),
            ])
        );
        assert_eq!(object_outline(&TiledObject::Point), None);
    }

    #[test]
    fn test_danger_zone_resets_body() {
        let mut world = World::new();
        world.init_resource::<ItemsCollected>();
        world.add_observer(on_platformer_trigger);

        let body = world
            .spawn((
                LevelPosition(Vec2::new(200.0, 50.0)),
                Velocity(Vec2::new(150.0, 300.0)),
                SpawnPoint(Vec2::new(16.0, 16.0)),
            ))
            .id();
        let zone = world.spawn(DangerZone).id();
        let item = world.spawn(Collectible).id();

        world.trigger(TriggerEntered {
            body,
            trigger: zone,
        });
        assert_eq!(
            world.get::<LevelPosition>(body).map(|p| p.0),
            Some(Vec2::new(16.0, 16.0))
        );
        assert_eq!(world.get::<Velocity>(body).map(|v| v.0), Some(Vec2::ZERO));

        world.trigger(TriggerEntered {
            body,
            trigger: item,
        });
        world.flush();
        assert!(world.get_entity(item).is_err());
        assert_eq!(world.resource::<ItemsCollected>().0, 1);
    }
}
