//! Game plugin.

use bevy::prelude::*;
use fortloop_assets::FortloopAssetsPlugin;
use fortloop_core::{FortloopCorePlugin, LevelCoreConfig};

use crate::animation::animate_sprites;
use crate::behavior::{BehaviorRegistry, run_behaviors};
use crate::camera::{fit_platformer_camera, follow_camera_target};
use crate::combat::{CombatRoster, update_combat};
use crate::config::{CavemanTuning, CombatConfig, GameConfig, GameScene};
use crate::debug::{DebugToggles, draw_debug_overlays, toggle_debug_overlays};
use crate::input::{VirtualInputs, update_virtual_inputs};
use crate::physics::LevelCollision;
use crate::platformer::{
    ItemsCollected, on_platformer_object, on_platformer_tile_layer, on_platformer_trigger,
    setup_platformer,
};
use crate::render::{
    TilesetLayouts, spawn_ldtk_tile_sprites, spawn_tiled_tile_sprites, sync_level_transforms,
};
use crate::shooter::{
    CurrentLevel, bob_gun_pickups, collect_gun, on_shooter_entity, on_shooter_int_grid,
    on_shooter_world_spawned, setup_shooter, track_current_level,
};

/// Loads the configured scene and runs it.
///
/// Pulls in the asset and level plugins, so only `DefaultPlugins` need to be
/// added next to it.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use fortloop::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins.set(ImagePlugin::default_nearest()))
///     .add_plugins(FortloopPlugin::default().with_scene(GameScene::LdtkShooter))
///     .run();
/// ```
#[derive(Default)]
pub struct FortloopPlugin {
    pub game: GameConfig,
    pub tuning: CavemanTuning,
    pub combat: CombatConfig,
    pub core: LevelCoreConfig,
}

impl FortloopPlugin {
    pub fn with_scene(mut self, scene: GameScene) -> Self {
        self.game.scene = scene;
        self
    }

    pub fn with_game(mut self, config: GameConfig) -> Self {
        self.game = config;
        self
    }

    pub fn with_tuning(mut self, tuning: CavemanTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_combat(mut self, config: CombatConfig) -> Self {
        self.combat = config;
        self
    }

    pub fn with_core(mut self, config: LevelCoreConfig) -> Self {
        self.core = config;
        self
    }
}

impl Plugin for FortloopPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FortloopAssetsPlugin);
        app.add_plugins(FortloopCorePlugin::new(self.core.clone()));

        app.register_type::<GameConfig>()
            .register_type::<CavemanTuning>()
            .register_type::<CombatConfig>()
            .insert_resource(self.game.clone())
            .insert_resource(self.tuning)
            .insert_resource(self.combat)
            .init_resource::<VirtualInputs>()
            .init_resource::<BehaviorRegistry>()
            .init_resource::<LevelCollision>()
            .init_resource::<TilesetLayouts>()
            .init_resource::<DebugToggles>();

        // Inputs are sampled before any behavior reads them
        app.add_systems(PreUpdate, update_virtual_inputs);

        app.add_observer(spawn_tiled_tile_sprites)
            .add_observer(spawn_ldtk_tile_sprites);

        match self.game.scene {
            GameScene::TiledPlatformer => {
                app.init_resource::<ItemsCollected>()
                    .add_systems(Startup, setup_platformer)
                    .add_observer(on_platformer_object)
                    .add_observer(on_platformer_tile_layer)
                    .add_observer(on_platformer_trigger)
                    .add_systems(
                        Update,
                        (run_behaviors, sync_level_transforms, fit_platformer_camera).chain(),
                    );
            }
            GameScene::LdtkShooter => {
                app.init_resource::<CombatRoster>()
                    .init_resource::<CurrentLevel>()
                    .add_systems(Startup, setup_shooter)
                    .add_observer(on_shooter_entity)
                    .add_observer(on_shooter_int_grid)
                    .add_observer(on_shooter_world_spawned)
                    .add_systems(
                        Update,
                        (
                            run_behaviors,
                            update_combat,
                            bob_gun_pickups,
                            collect_gun,
                            track_current_level,
                            sync_level_transforms,
                            follow_camera_target,
                        )
                            .chain(),
                    );
            }
        }

        app.add_systems(
            Update,
            (
                animate_sprites.after(run_behaviors),
                toggle_debug_overlays,
            ),
        );
        app.add_systems(PostUpdate, draw_debug_overlays);

        info!("FortloopPlugin initialized ({:?})", self.game.scene);
    }
}
