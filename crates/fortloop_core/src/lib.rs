//! # `fortloop_core`
//!
//! Entity spawning for loaded level assets. Converts `TiledMapAsset`s and
//! LDtk worlds into ECS hierarchies and fires events the game hooks into.
//!
//! **This crate does NOT handle rendering or gameplay.** Those plug in via
//! events and component queries.
//!
//! ## Architecture
//!
//! Layer 2 (this crate) sits between:
//! - **Layer 1** (`fortloop_assets`): Pure asset loading
//! - **Layer 3** (`fortloop`): Rendering, collision and gameplay
//!
//! ## What Layer 2 Provides
//!
//! 1. **Entity hierarchy**: maps/levels, layers, objects and LDtk entities
//! 2. **Pre-processed data**: `TileLayerData`, `IntGridData`, `LdtkTileLayerData`
//! 3. **Geometry**: `LevelGeometry` in level space (Y down)
//! 4. **Events**: extension hooks for Layer 3
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use fortloop_assets::FortloopAssetsPlugin;
//! use fortloop_core::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(FortloopAssetsPlugin)
//!         .add_plugins(FortloopCorePlugin::default())
//!         .add_systems(Startup, spawn_map)
//!         .run();
//! }
//!
//! fn spawn_map(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(TiledMap {
//!         handle: asset_server.load("platformer/tiledMap.tmx"),
//!     });
//! }
//! ```

pub mod components;
pub mod coords;
pub mod debug;
pub mod events;
pub mod plugin;
pub mod spawn;
pub mod systems;

pub mod prelude {
    //! Common imports for `fortloop_core` users.

    pub use crate::components::{
        IntGridData, LayerId, LayerName, LayersInMap, LdtkEntity, LdtkLayer, LdtkLevel, LdtkTile,
        LdtkTileLayerData, LdtkWorld, LevelGeometry, LevelSceneRoot, LevelsInWorld, ObjectInfo,
        TileInstance, TileLayerData, TiledLayer, TiledMap, TiledObject,
    };
    pub use crate::coords::{level_rect_to_render, level_to_render, render_to_level};
    pub use crate::debug::DebugLevelGeometry;
    pub use crate::events::{
        IntGridLayerSpawned, LdtkEntitySpawned, LdtkTileLayerSpawned, LdtkWorldSpawned,
        MapSpawned, ObjectLayerSpawned, ObjectSpawned, TileLayerSpawned,
    };
    pub use crate::plugin::{FortloopCorePlugin, LayerZConfig, LevelCoreConfig};
}

pub use plugin::{FortloopCorePlugin, LayerZConfig, LevelCoreConfig};
