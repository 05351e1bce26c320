//! Sprites for tile layers and level entities.
//!
//! Tile layers become one sprite child per tile, sampled from a texture
//! atlas laid over the tileset image. Simulated bodies keep their position in
//! [`LevelPosition`] and get their `Transform` written from it every frame.

use std::f32::consts::FRAC_PI_2;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use fortloop_assets::prelude::{LdtkProjectAsset, TiledMapAsset, TilesetImage};
use fortloop_core::prelude::*;

use crate::physics::LevelPosition;

/// Atlas layouts shared by every layer drawing from the same tileset image.
#[derive(Resource, Debug, Default)]
pub struct TilesetLayouts {
    layouts: HashMap<AssetId<Image>, Handle<TextureAtlasLayout>>,
}

impl TilesetLayouts {
    /// Layout for `image`, built from the grid the first time it is asked for.
    pub fn get_or_insert(
        &mut self,
        image: &Handle<Image>,
        layouts: &mut Assets<TextureAtlasLayout>,
        build: impl FnOnce() -> TextureAtlasLayout,
    ) -> Handle<TextureAtlasLayout> {
        self.layouts
            .entry(image.id())
            .or_insert_with(|| layouts.add(build()))
            .clone()
    }
}

/// Atlas over a Tiled tileset image.
pub(crate) fn tiled_layout(tileset: &TilesetImage) -> TextureAtlasLayout {
    TextureAtlasLayout::from_grid(
        tileset.tile_size,
        tileset.grid_size.x,
        tileset.grid_size.y,
        Some(UVec2::splat(tileset.spacing)),
        Some(UVec2::splat(tileset.margin)),
    )
}

/// Placement of one Tiled tile inside its layer, in render space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub translation: Vec2,
    pub rotation: Quat,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Tiled anchors tiles at the bottom-left of their cell, so tiles taller than
/// the map grid overhang upwards.
pub fn tiled_tile_placement(
    x: u32,
    y: u32,
    cell_size: UVec2,
    tile_size: UVec2,
    tile: &TileInstance,
) -> TilePlacement {
    let cell = cell_size.as_vec2();
    let size = tile_size.as_vec2();
    let translation = Vec2::new(
        x as f32 * cell.x + size.x / 2.0,
        -((y + 1) as f32 * cell.y - size.y / 2.0),
    );

    // Diagonal flips swap the axes: a quarter turn plus a mirror
    if tile.flipped_d {
        TilePlacement {
            translation,
            rotation: Quat::from_rotation_z(FRAC_PI_2),
            flip_x: !tile.flipped_v,
            flip_y: tile.flipped_h,
        }
    } else {
        TilePlacement {
            translation,
            rotation: Quat::IDENTITY,
            flip_x: tile.flipped_h,
            flip_y: tile.flipped_v,
        }
    }
}

/// Spawns a sprite for every tile of a Tiled tile layer.
pub fn spawn_tiled_tile_sprites(
    trigger: On<TileLayerSpawned>,
    maps: Query<&TiledMap>,
    layers: Query<&TileLayerData>,
    map_assets: Res<Assets<TiledMapAsset>>,
    mut atlas_layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut cache: ResMut<TilesetLayouts>,
    mut commands: Commands,
) {
    let event = trigger.event();
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

    let mut sprites = Vec::new();
    for (x, y, tile) in data.iter_tiles() {
        let Some(tileset) = asset.tilesets.get(&tile.tileset_index) else {
            continue;
        };
        let layout = cache.get_or_insert(&tileset.image, &mut atlas_layouts, || {
            tiled_layout(tileset)
        });
        let placement = tiled_tile_placement(x, y, asset.tile_size, tileset.tile_size, tile);

        let mut sprite = Sprite::from_atlas_image(
            tileset.image.clone(),
            TextureAtlas {
                layout,
                index: tile.tile_id as usize,
            },
        );
        sprite.flip_x = placement.flip_x;
        sprite.flip_y = placement.flip_y;

        let entity = commands
            .spawn((
                sprite,
                Transform::from_translation(placement.translation.extend(0.0))
                    .with_rotation(placement.rotation),
            ))
            .id();
        sprites.push(entity);
    }

    debug!("Layer '{}': {} tile sprites", event.name, sprites.len());
    commands.entity(event.entity).add_children(&sprites);
}

/// Spawns a sprite for every tile of an LDtk layer.
pub fn spawn_ldtk_tile_sprites(
    trigger: On<LdtkTileLayerSpawned>,
    worlds: Query<&LdtkWorld>,
    layers: Query<&LdtkTileLayerData>,
    projects: Res<Assets<LdtkProjectAsset>>,
    mut atlas_layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut cache: ResMut<TilesetLayouts>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let Ok(data) = layers.get(event.entity) else {
        return;
    };
    let Some((tileset, image)) = worlds
        .iter()
        .filter_map(|world| projects.get(&world.handle))
        .find_map(|asset| asset.tileset(event.tileset_uid))
    else {
        warn!(
            "Layer '{}': tileset {} has no image",
            event.identifier, event.tileset_uid
        );
        return;
    };

    let (columns, rows) = tileset.grid_size();
    let layout = cache.get_or_insert(image, &mut atlas_layouts, || {
        TextureAtlasLayout::from_grid(
            UVec2::splat(tileset.tile_grid_size),
            columns,
            rows,
            Some(UVec2::splat(tileset.spacing)),
            Some(UVec2::splat(tileset.padding)),
        )
    });

    let half = data.grid_size as f32 / 2.0;
    let sprites: Vec<Entity> = data
        .tiles
        .iter()
        .map(|tile| {
            let mut sprite = Sprite::from_atlas_image(
                image.clone(),
                TextureAtlas {
                    layout: layout.clone(),
                    index: tile.atlas_index,
                },
            );
            sprite.flip_x = tile.flip_x;
            sprite.flip_y = tile.flip_y;
            sprite.color = Color::srgba(1.0, 1.0, 1.0, tile.alpha);

            let center = level_to_render(tile.position + Vec2::splat(half));
            commands
                .spawn((sprite, Transform::from_translation(center.extend(0.0))))
                .id()
        })
        .collect();

    commands.entity(event.entity).add_children(&sprites);
}

/// Sprite showing an LDtk entity's editor tile, if it has one.
pub fn ldtk_entity_sprite(asset: &LdtkProjectAsset, entity: &LdtkEntity) -> Option<Sprite> {
    let tile = entity.tile?;
    let (_, image) = asset.tileset(tile.tileset_uid)?;
    let min = Vec2::new(tile.x as f32, tile.y as f32);
    let mut sprite = Sprite::from_image(image.clone());
    sprite.rect = Some(Rect::from_corners(
        min,
        min + Vec2::new(tile.w as f32, tile.h as f32),
    ));
    sprite.custom_size = Some(entity.size);
    Some(sprite)
}

/// Writes level positions into render transforms, keeping z.
pub fn sync_level_transforms(
    mut query: Query<(&LevelPosition, &mut Transform), Changed<LevelPosition>>,
) {
    for (position, mut transform) in &mut query {
        let render = level_to_render(position.0);
        transform.translation.x = render.x;
        transform.translation.y = render.y;
    }
}
