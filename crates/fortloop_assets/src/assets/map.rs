use bevy::{platform::collections::HashMap, prelude::*};

#[derive(TypePath, Asset, Debug)]
pub struct TiledMapAsset {
    /// The raw Tiled map data
    pub map: tiled::Map,

    /// Tileset images
    /// Key: Tileset index (matches `LayerTile::tileset_index()`)
    pub tilesets: HashMap<u32, TilesetImage>,

    /// Map size in tiles
    pub tilemap_size: UVec2,

    /// Size of one map cell in pixels
    pub tile_size: UVec2,

    /// Map bounds in level pixels (origin top-left, Y down)
    pub rect: Rect,
}

/// Grid description of a single-image tileset.
#[derive(Debug, Clone)]
pub struct TilesetImage {
    pub image: Handle<Image>,
    pub tile_size: UVec2,
    /// Grid size as (columns, rows)
    pub grid_size: UVec2,
    pub spacing: u32,
    pub margin: u32,
    /// First GID of this tileset in the map
    pub first_gid: u32,
}

impl TiledMapAsset {
    /// Tile layer by name, searching group layers depth first.
    pub fn tile_layer(&self, name: &str) -> Option<tiled::TileLayer<'_>> {
        find_layer(self.map.layers(), name).and_then(|layer| layer.as_tile_layer())
    }

    /// Object layer by name, searching group layers depth first.
    pub fn object_layer(&self, name: &str) -> Option<tiled::ObjectLayer<'_>> {
        find_layer(self.map.layers(), name).and_then(|layer| layer.as_object_layer())
    }
}

fn find_layer<'map>(
    layers: impl Iterator<Item = tiled::Layer<'map>>,
    name: &str,
) -> Option<tiled::Layer<'map>> {
    for layer in layers {
        if layer.name == name {
            return Some(layer);
        }
        if let Some(group) = layer.as_group_layer()
            && let Some(found) = find_layer(group.layers(), name)
        {
            return Some(found);
        }
    }
    None
}
