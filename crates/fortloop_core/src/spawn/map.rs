//! Tiled map spawning: layers, tile data and objects.

use bevy::prelude::*;
use tiled::{LayerType, ObjectShape};

use crate::components::{
    LayerId, LayerName, LayersInMap, LevelGeometry, ObjectInfo, TileInstance, TileLayerData,
    TiledLayer, TiledObject,
};
use crate::events::{ObjectLayerSpawned, ObjectSpawned, TileLayerSpawned};
use crate::systems::SpawnContext;

/// Spawn the entity hierarchy for a map.
///
/// - Tile layers: `TileLayerData` with pre-processed tiles
/// - Object layers: one entity per object as children
/// - Group layers: recursive layer hierarchy
///
/// Image layers are skipped.
pub fn spawn_map(commands: &mut Commands, map_entity: Entity, context: &SpawnContext) {
    let mut layer_entities = Vec::new();
    let mut z_counter = 0;

    for layer in context.map_asset.map.layers() {
        let layer_entity = spawn_layer(
            commands,
            &layer,
            map_entity,
            Vec2::ZERO,
            context,
            &mut z_counter,
        );
        layer_entities.push(layer_entity);
    }

    let map = &context.map_asset.map;
    let geometry = LevelGeometry::new(
        map.width,
        map.height,
        map.tile_width as f32,
        map.tile_height as f32,
    );

    commands
        .entity(map_entity)
        .insert((LayersInMap(layer_entities.clone()), geometry))
        .add_children(&layer_entities);
}

/// Spawn a single layer entity, recursing into groups.
///
/// `parent_offset` is the accumulated level-space offset of enclosing groups.
/// Content layers get sequential z values, groups get 0.
fn spawn_layer(
    commands: &mut Commands,
    layer: &tiled::Layer,
    map_entity: Entity,
    parent_offset: Vec2,
    context: &SpawnContext,
    z_counter: &mut usize,
) -> Entity {
    let layer_type = match layer.layer_type() {
        LayerType::Tiles(_) => TiledLayer::Tiles,
        LayerType::Objects(_) => TiledLayer::Objects,
        LayerType::Image(_) => TiledLayer::Image,
        LayerType::Group(_) => TiledLayer::Group,
    };

    let z = if layer_type == TiledLayer::Group {
        0.0
    } else {
        context.next_z(z_counter)
    };

    let offset = parent_offset + Vec2::new(layer.offset_x, layer.offset_y);
    let transform = Transform::from_xyz(layer.offset_x, -layer.offset_y, z);
    let visibility = if layer.visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };

    let layer_entity = commands
        .spawn((
            layer_type,
            LayerId(layer.id()),
            LayerName(layer.name.clone()),
            transform,
            visibility,
            Name::new(format!("Layer: {}", layer.name)),
        ))
        .id();

    match layer.layer_type() {
        LayerType::Tiles(_) => {
            if let Some(tile_data) = build_tile_layer_data(layer, context) {
                commands.entity(layer_entity).insert(tile_data);
            }

            commands.trigger(TileLayerSpawned {
                entity: layer_entity,
                map_entity,
                layer_id: layer.id(),
                name: layer.name.clone(),
            });
        }

        LayerType::Objects(_) => {
            let object_entities = spawn_objects_layer(commands, layer, map_entity, offset);
            commands.entity(layer_entity).add_children(&object_entities);

            commands.trigger(ObjectLayerSpawned {
                entity: layer_entity,
                map_entity,
                layer_id: layer.id(),
                name: layer.name.clone(),
            });
        }

        LayerType::Image(_) => {
            debug!("Skipping image layer '{}'", layer.name);
        }

        LayerType::Group(group) => {
            let children: Vec<Entity> = group
                .layers()
                .map(|child| {
                    spawn_layer(commands, &child, map_entity, offset, context, z_counter)
                })
                .collect();
            commands.entity(layer_entity).add_children(&children);
        }
    }

    layer_entity
}

/// Build `TileLayerData` component from a tile layer.
///
/// Tiles whose tileset has no image are dropped with a warning.
pub fn build_tile_layer_data(layer: &tiled::Layer, context: &SpawnContext) -> Option<TileLayerData> {
    let LayerType::Tiles(tile_layer) = layer.layer_type() else {
        return None;
    };

    let width = tile_layer.width().unwrap_or(0);
    let height = tile_layer.height().unwrap_or(0);

    let mut tile_data = TileLayerData::empty(width, height);

    for y in 0..height {
        for x in 0..width {
            let Some(tile) = tile_layer.get_tile(x as i32, y as i32) else {
                continue;
            };

            let tileset_index = tile.tileset_index() as u32;
            if context.get_tileset_by_index(tileset_index).is_none() {
                warn!(
                    "Tile at ({}, {}) in layer '{}' references tileset index {} which has no image",
                    x, y, layer.name, tileset_index
                );
                continue;
            }

            tile_data.set(
                x,
                y,
                Some(TileInstance {
                    tileset_index,
                    tile_id: tile.id(),
                    flipped_h: tile.flip_h,
                    flipped_v: tile.flip_v,
                    flipped_d: tile.flip_d,
                }),
            );
        }
    }

    Some(tile_data)
}

/// Spawn object entities for an object layer.
///
/// `layer_offset` is the level-space offset of the layer; object positions in
/// `ObjectInfo` include it.
fn spawn_objects_layer(
    commands: &mut Commands,
    layer: &tiled::Layer,
    map_entity: Entity,
    layer_offset: Vec2,
) -> Vec<Entity> {
    let LayerType::Objects(object_layer) = layer.layer_type() else {
        return Vec::new();
    };

    let mut object_entities = Vec::new();

    for object in object_layer.objects() {
        let shape = match &object.shape {
            ObjectShape::Rect { width, height } => TiledObject::Rectangle {
                width: *width,
                height: *height,
            },
            ObjectShape::Ellipse { width, height } => TiledObject::Ellipse {
                width: *width,
                height: *height,
            },
            ObjectShape::Polyline { points } => TiledObject::Polyline {
                vertices: points.iter().map(|(x, y)| Vec2::new(*x, *y)).collect(),
            },
            ObjectShape::Polygon { points } => TiledObject::Polygon {
                vertices: points.iter().map(|(x, y)| Vec2::new(*x, *y)).collect(),
            },
            ObjectShape::Point(_, _) => TiledObject::Point,
            ObjectShape::Text { .. } => TiledObject::Text,
        };

        // Tiled rotates clockwise in a Y-down space
        let transform = Transform::from_xyz(object.x, -object.y, 0.0)
            .with_rotation(Quat::from_rotation_z(-object.rotation.to_radians()));

        let info = ObjectInfo {
            id: object.id(),
            name: object.name.clone(),
            class: object.user_type.clone(),
            group: layer.name.clone(),
            position: layer_offset + Vec2::new(object.x, object.y),
        };

        let entity = commands
            .spawn((
                shape,
                info,
                transform,
                Visibility::default(),
                Name::new(format!("Object: {}", object.name)),
            ))
            .id();
        object_entities.push(entity);

        commands.trigger(ObjectSpawned {
            entity,
            map_entity,
            object_id: object.id(),
            name: object.name.clone(),
            group: layer.name.clone(),
        });
    }

    object_entities
}
