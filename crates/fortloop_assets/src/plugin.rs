use bevy::prelude::*;

use crate::assets::{ldtk::LdtkProjectAsset, map::TiledMapAsset};
use crate::loaders::{ldtk::LdtkProjectAssetLoader, map::TiledMapAssetLoader};

/// Plugin that registers the level asset types and their loaders
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use fortloop_assets::FortloopAssetsPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(FortloopAssetsPlugin)
///     .run();
/// ```
///
/// Registers `TiledMapAsset` for `.tmx` files and `LdtkProjectAsset` for
/// `.ldtk` files. Entity spawning is left to `fortloop_core`.
pub struct FortloopAssetsPlugin;

impl Plugin for FortloopAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<TiledMapAsset>()
            .init_asset::<LdtkProjectAsset>();

        app.register_asset_loader(TiledMapAssetLoader)
            .register_asset_loader(LdtkProjectAssetLoader);
    }
}
