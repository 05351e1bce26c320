//! Spawn context for accessing asset data during entity spawning.

use fortloop_assets::prelude::{TiledMapAsset, TilesetImage};

use crate::plugin::LayerZConfig;

/// Read-only context shared by the Tiled spawn functions.
pub struct SpawnContext<'a> {
    /// The map asset being spawned
    pub map_asset: &'a TiledMapAsset,

    /// Z-ordering for content layers
    pub z_config: &'a LayerZConfig,
}

impl<'a> SpawnContext<'a> {
    pub fn new(map_asset: &'a TiledMapAsset, z_config: &'a LayerZConfig) -> Self {
        Self {
            map_asset,
            z_config,
        }
    }

    /// Get tileset image by index.
    ///
    /// The index corresponds to `LayerTile::tileset_index()` from the tiled crate.
    pub fn get_tileset_by_index(&self, tileset_index: u32) -> Option<&TilesetImage> {
        self.map_asset.tilesets.get(&tileset_index)
    }

    /// Z value for the next content layer.
    pub fn next_z(&self, z_counter: &mut usize) -> f32 {
        let z = self.z_config.offset + (*z_counter as f32) * self.z_config.multiplier;
        *z_counter += 1;
        z
    }
}
