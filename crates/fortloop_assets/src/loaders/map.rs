use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    platform::collections::HashMap,
    prelude::*,
    tasks::ConditionalSendFuture,
};
use thiserror::Error;

use crate::assets::map::{TiledMapAsset, TilesetImage};
use crate::loaders::{InvalidPathError, resolve_relative_path};

/// Asset loader for Tiled maps (.tmx files)
///
/// External tilesets are parsed by the `tiled` crate while loading the map.
/// Every single-image tileset contributes its image as a dependency.
#[derive(Default)]
pub struct TiledMapAssetLoader;

#[derive(Debug, Error)]
pub enum MapLoaderError {
    #[error("Failed to load map: {0}")]
    TiledError(#[from] tiled::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    #[error("Infinite maps are not supported: {0}")]
    Infinite(String),
}

impl AssetLoader for TiledMapAssetLoader {
    type Asset = TiledMapAsset;
    type Settings = ();
    type Error = MapLoaderError;

    fn load(
        &self,
        _reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            let asset_path = load_context.asset_path().path();

            // Bevy loads assets from the "assets" directory by default
            let full_path = std::path::Path::new("assets").join(asset_path);

            let mut loader = tiled::Loader::new();
            let map = loader.load_tmx_map(&full_path)?;

            if map.infinite() {
                return Err(MapLoaderError::Infinite(full_path.display().to_string()));
            }

            // Key by tileset_index (iteration order matches tiled's tileset_index())
            let mut tilesets = HashMap::default();
            let mut current_gid = 1u32; // GIDs start at 1

            for (tileset_index, tileset) in map.tilesets().iter().enumerate() {
                let first_gid = current_gid;
                current_gid += tileset.tilecount;

                let Some(image) = &tileset.image else {
                    warn!(
                        "Tileset '{}' is an image collection, its tiles will not be drawn",
                        tileset.name
                    );
                    continue;
                };

                let image_path = resolve_relative_path(load_context, &image.source)?;
                tilesets.insert(
                    tileset_index as u32,
                    TilesetImage {
                        image: load_context.load(image_path),
                        tile_size: UVec2::new(tileset.tile_width, tileset.tile_height),
                        grid_size: calculate_grid_size(tileset),
                        spacing: tileset.spacing,
                        margin: tileset.margin,
                        first_gid,
                    },
                );
            }

            let tilemap_size = UVec2::new(map.width, map.height);
            let tile_size = UVec2::new(map.tile_width, map.tile_height);
            let rect = Rect::from_corners(Vec2::ZERO, (tilemap_size * tile_size).as_vec2());

            debug!(
                "Loaded map {} ({}x{} tiles, {} tilesets)",
                full_path.display(),
                tilemap_size.x,
                tilemap_size.y,
                tilesets.len()
            );

            Ok(TiledMapAsset {
                map,
                tilesets,
                tilemap_size,
                tile_size,
                rect,
            })
        }
    }

    fn extensions(&self) -> &[&str] {
        &["tmx"]
    }
}

/// Calculate grid size (columns, rows) for a tileset
///
/// Image collections (no columns) have no grid and return `UVec2::ZERO`.
fn calculate_grid_size(tileset: &tiled::Tileset) -> UVec2 {
    if tileset.columns > 0 {
        let rows = tileset.tilecount.div_ceil(tileset.columns);
        UVec2::new(tileset.columns, rows)
    } else {
        UVec2::ZERO
    }
}
