//! # `fortloop_assets`
//!
//! Asset loading for the two level formats the game reads:
//!
//! - Tiled maps (`.tmx`), parsed with the `tiled` crate into [`TiledMapAsset`]
//! - LDtk projects (`.ldtk`), parsed with `serde_json` into [`LdtkProjectAsset`]
//!
//! This is the bottom layer: no entities are spawned here. The [`ldtk`]
//! module also carries the query API used to look up worlds, levels,
//! entities and custom fields.

pub mod assets;
pub mod ldtk;
pub mod loaders;
pub mod plugin;

pub mod prelude {
    //! Common imports for `fortloop_assets` users.

    pub use crate::assets::{
        ldtk::LdtkProjectAsset,
        map::{TiledMapAsset, TilesetImage},
    };
    pub use crate::ldtk::{EntityInstance, EntityRef, FieldError, Level, Project, WorldDef};
    pub use crate::loaders::{ldtk::LdtkLoaderError, map::MapLoaderError};
    pub use crate::plugin::FortloopAssetsPlugin;
}

pub use assets::{ldtk::LdtkProjectAsset, map::TiledMapAsset};
pub use plugin::FortloopAssetsPlugin;
