//! Components for the `fortloop_core` entity hierarchy.

pub mod layer;
pub mod ldtk;
pub mod map;
pub mod object;
pub mod tile;

pub use layer::{LayerId, LayerName, TiledLayer};
pub use ldtk::{
    IntGridData, LdtkEntity, LdtkLayer, LdtkLevel, LdtkTile, LdtkTileLayerData, LdtkWorld,
    LevelsInWorld,
};
pub use map::{LayersInMap, LevelGeometry, LevelSceneRoot, TiledMap};
pub use object::{ObjectInfo, TiledObject};
pub use tile::{TileInstance, TileLayerData};
