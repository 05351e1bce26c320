//! LDtk world spawning: levels, layers and entity instances.

use bevy::prelude::*;
use fortloop_assets::ldtk::{LayerInstance, LayerType, Level, WorldDef};
use fortloop_assets::prelude::LdtkProjectAsset;

use crate::components::{
    IntGridData, LdtkEntity, LdtkLayer, LdtkLevel, LdtkTile, LdtkTileLayerData, LevelGeometry,
};
use crate::coords::level_to_render;
use crate::events::{IntGridLayerSpawned, LdtkEntitySpawned, LdtkTileLayerSpawned};
use crate::plugin::LayerZConfig;

/// Spawn every level of `world` under `world_entity`.
///
/// Levels become children of the world root, placed at their world position.
/// Layers become children of their level. Entity instances are spawned as
/// children of the world root so gameplay can move them between levels.
///
/// Returns the level entities in file order.
pub fn spawn_ldtk_world(
    commands: &mut Commands,
    world_entity: Entity,
    asset: &LdtkProjectAsset,
    world: &WorldDef,
    z_config: &LayerZConfig,
) -> Vec<Entity> {
    let mut level_entities = Vec::with_capacity(world.levels.len());

    for level in &world.levels {
        let level_entity = spawn_level(commands, world_entity, asset, level, z_config);
        level_entities.push(level_entity);
    }

    commands.entity(world_entity).add_children(&level_entities);
    level_entities
}

fn spawn_level(
    commands: &mut Commands,
    world_entity: Entity,
    asset: &LdtkProjectAsset,
    level: &Level,
    z_config: &LayerZConfig,
) -> Entity {
    let bounds = level.bounds();
    let grid = level.layers().first().map_or(16, |layer| layer.grid_size).max(1);
    let geometry = LevelGeometry {
        size: UVec2::new(level.px_wid / grid, level.px_hei / grid),
        tile_size: Vec2::splat(grid as f32),
        bounds,
    };

    let origin = level_to_render(bounds.min);
    let level_entity = commands
        .spawn((
            LdtkLevel {
                identifier: level.identifier.clone(),
                iid: level.iid.clone(),
            },
            geometry,
            Transform::from_xyz(origin.x, origin.y, 0.0),
            Visibility::default(),
            Name::new(format!("Level: {}", level.identifier)),
        ))
        .id();

    // LDtk lists layers top-most first
    let layers = level.layers();
    let mut layer_entities = Vec::with_capacity(layers.len());
    for (index, layer) in layers.iter().enumerate() {
        let z = z_config.offset + (layers.len() - 1 - index) as f32 * z_config.multiplier;
        let layer_entity = spawn_layer(commands, world_entity, level_entity, asset, level, layer, z);
        layer_entities.push(layer_entity);
    }

    commands.entity(level_entity).add_children(&layer_entities);
    level_entity
}

fn spawn_layer(
    commands: &mut Commands,
    world_entity: Entity,
    level_entity: Entity,
    asset: &LdtkProjectAsset,
    level: &Level,
    layer: &LayerInstance,
    z: f32,
) -> Entity {
    let offset = layer.offset().as_vec2();
    let visibility = if layer.visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };

    let layer_entity = commands
        .spawn((
            LdtkLayer {
                identifier: layer.identifier.clone(),
                level_iid: level.iid.clone(),
                layer_type: layer.layer_type.into(),
            },
            Transform::from_xyz(offset.x, -offset.y, z),
            visibility,
            Name::new(format!("Layer: {}", layer.identifier)),
        ))
        .id();

    match layer.layer_type {
        LayerType::IntGrid => {
            commands.entity(layer_entity).insert(IntGridData {
                width: layer.c_wid,
                height: layer.c_hei,
                cell_size: layer.grid_size as f32,
                origin: level.bounds().min + offset,
                values: layer.int_grid_csv.clone(),
            });
            commands.trigger(IntGridLayerSpawned {
                entity: layer_entity,
                level_entity,
                identifier: layer.identifier.clone(),
            });
        }
        LayerType::Entities => {
            for instance in &layer.entity_instances {
                let position = instance.world_position(level);
                let render = level_to_render(position);
                let entity = commands
                    .spawn((
                        LdtkEntity {
                            identifier: instance.identifier.clone(),
                            iid: instance.iid.clone(),
                            level_iid: level.iid.clone(),
                            position,
                            size: instance.size(),
                            pivot: Vec2::from(instance.pivot),
                            tile: instance.tile,
                        },
                        Transform::from_xyz(render.x, render.y, z),
                        Visibility::default(),
                        Name::new(format!("Entity: {}", instance.identifier)),
                    ))
                    .id();
                commands.entity(world_entity).add_child(entity);

                commands.trigger(LdtkEntitySpawned {
                    entity,
                    world_entity,
                    identifier: instance.identifier.clone(),
                    iid: instance.iid.clone(),
                });
            }
        }
        LayerType::Tiles | LayerType::AutoLayer => {}
    }

    // Tile and auto layers draw tiles, and so can IntGrid layers with rules
    if !layer.tiles().is_empty()
        && let Some(tile_data) = build_ldtk_tile_data(asset, layer)
    {
        let tileset_uid = tile_data.tileset_uid;
        commands.entity(layer_entity).insert(tile_data);
        commands.trigger(LdtkTileLayerSpawned {
            entity: layer_entity,
            level_entity,
            identifier: layer.identifier.clone(),
            tileset_uid,
        });
    }

    layer_entity
}

/// Resolve tile atlas indices against the layer's tileset.
pub(crate) fn build_ldtk_tile_data(
    asset: &LdtkProjectAsset,
    layer: &LayerInstance,
) -> Option<LdtkTileLayerData> {
    let Some(tileset_uid) = layer.tileset_def_uid else {
        warn!("Layer '{}' has tiles but no tileset", layer.identifier);
        return None;
    };
    let Some(tileset) = asset.project.tileset(tileset_uid) else {
        warn!(
            "Layer '{}' references unknown tileset {}",
            layer.identifier, tileset_uid
        );
        return None;
    };

    let mut skipped = 0usize;
    let tiles = layer
        .tiles()
        .iter()
        .filter_map(|tile| {
            let Some(atlas_index) = tileset.tile_index(IVec2::from(tile.src)) else {
                skipped += 1;
                return None;
            };
            Some(LdtkTile {
                position: IVec2::from(tile.px).as_vec2(),
                atlas_index,
                flip_x: tile.flip_x(),
                flip_y: tile.flip_y(),
                alpha: tile.a,
            })
        })
        .collect();

    if skipped > 0 {
        warn!(
            "Layer '{}': {} tiles fall outside tileset '{}'",
            layer.identifier, skipped, tileset.identifier
        );
    }

    Some(LdtkTileLayerData {
        tileset_uid,
        grid_size: layer.grid_size,
        tiles,
    })
}
