//! Tile layer data components.
//!
//! Individual tiles are NOT spawned as entities by this crate. Tile data is
//! stored in the `TileLayerData` component attached to tile layer entities.

use bevy::prelude::*;

/// Raw tile grid data attached to Tiled tile layer entities.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct TileLayerData {
    /// Layer width in tiles
    pub width: u32,

    /// Layer height in tiles
    pub height: u32,

    /// Flattened grid of tiles: index = y * width + x
    /// None = empty tile
    pub tiles: Vec<Option<TileInstance>>,
}

impl TileLayerData {
    /// Create an empty tile layer with the given dimensions.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![None; (width * height) as usize],
        }
    }

    /// Get tile at position (returns None if out of bounds or empty).
    pub fn get(&self, x: u32, y: u32) -> Option<&TileInstance> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize)?.as_ref()
    }

    /// Set tile at position.
    pub fn set(&mut self, x: u32, y: u32, tile: Option<TileInstance>) {
        if x < self.width && y < self.height {
            let index = (y * self.width + x) as usize;
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    /// Iterate all non-empty tiles with their positions.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (u32, u32, &TileInstance)> {
        self.tiles.iter().enumerate().filter_map(|(idx, tile)| {
            tile.as_ref().map(|t| {
                let x = (idx as u32) % self.width;
                let y = (idx as u32) / self.width;
                (x, y, t)
            })
        })
    }

    /// Solidity mask for collision: every non-empty cell is solid.
    pub fn solid_mask(&self) -> Vec<bool> {
        self.tiles.iter().map(Option::is_some).collect()
    }
}

/// A single tile in a `TileLayerData` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct TileInstance {
    /// Index of the tileset in the map (matches `LayerTile::tileset_index()`)
    pub tileset_index: u32,
    /// Local tile ID within the tileset
    pub tile_id: u32,
    pub flipped_h: bool,
    pub flipped_v: bool,
    pub flipped_d: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(tile_id: u32) -> TileInstance {
        TileInstance {
            tileset_index: 0,
            tile_id,
            flipped_h: false,
            flipped_v: false,
            flipped_d: false,
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut data = TileLayerData::empty(3, 2);
        data.set(2, 1, Some(tile(7)));
        data.set(5, 5, Some(tile(1)));

        assert_eq!(data.get(2, 1).map(|t| t.tile_id), Some(7));
        assert!(data.get(0, 0).is_none());
        assert!(data.get(5, 5).is_none());
        assert_eq!(data.iter_tiles().count(), 1);
    }

    #[test]
    fn test_solid_mask() {
        let mut data = TileLayerData::empty(2, 2);
        data.set(1, 0, Some(tile(0)));
        data.set(0, 1, Some(tile(3)));
        assert_eq!(data.solid_mask(), vec![false, true, true, false]);
    }
}
