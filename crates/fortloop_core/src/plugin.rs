//! Plugin for `fortloop_core`.

use bevy::prelude::*;

use crate::debug::{DebugLevelGeometry, draw_level_geometry_debug};
use crate::systems::{process_loaded_ldtk_worlds, process_loaded_maps};

/// Configuration for layer Z-ordering.
///
/// Z value = offset + (layer_index * multiplier)
///
/// Groups don't contribute to Z, only content layers are counted.
#[derive(Resource, Debug, Clone)]
pub struct LayerZConfig {
    /// Base Z offset for all layers
    pub offset: f32,
    /// Multiplier for layer index spacing
    pub multiplier: f32,
}

impl Default for LayerZConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            multiplier: 1.0,
        }
    }
}

/// Configuration for `FortloopCorePlugin`.
#[derive(Debug, Clone, Default)]
pub struct LevelCoreConfig {
    pub layer_z: LayerZConfig,
    /// Start with level bounds drawn
    pub debug_geometry: bool,
}

/// Plugin for the level spawning system.
///
/// Add this plugin after `FortloopAssetsPlugin` to enable automatic spawning
/// of `TiledMap` and `LdtkWorld` entities.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use fortloop_assets::FortloopAssetsPlugin;
/// use fortloop_core::FortloopCorePlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(FortloopAssetsPlugin)
///     .add_plugins(FortloopCorePlugin::default())
///     .run();
/// ```
#[derive(Default)]
pub struct FortloopCorePlugin {
    config: LevelCoreConfig,
}

impl FortloopCorePlugin {
    /// Create a new plugin with custom configuration.
    pub fn new(config: LevelCoreConfig) -> Self {
        Self { config }
    }
}

impl Plugin for FortloopCorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.layer_z.clone());

        // Runs in PreUpdate before user systems
        app.add_systems(
            PreUpdate,
            (process_loaded_maps, process_loaded_ldtk_worlds).chain(),
        );

        if self.config.debug_geometry {
            app.init_resource::<DebugLevelGeometry>();
        }

        app.add_systems(
            PostUpdate,
            draw_level_geometry_debug.run_if(resource_exists::<DebugLevelGeometry>),
        );
    }
}
