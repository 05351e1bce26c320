//! Main reactive spawning systems.

use bevy::asset::RecursiveDependencyLoadState;
use bevy::prelude::*;
use fortloop_assets::prelude::{LdtkProjectAsset, TiledMapAsset};

use crate::components::{LayersInMap, LdtkWorld, LevelsInWorld, TiledMap};
use crate::events::{LdtkWorldSpawned, MapSpawned};
use crate::plugin::LayerZConfig;
use crate::spawn::{spawn_ldtk_world, spawn_map};
use crate::systems::SpawnContext;

/// Spawns the hierarchy of every `TiledMap` whose asset and dependencies
/// have finished loading.
///
/// Runs in `PreUpdate` before user systems.
pub fn process_loaded_maps(
    asset_server: Res<AssetServer>,
    map_assets: Res<Assets<TiledMapAsset>>,
    z_config: Res<LayerZConfig>,
    mut commands: Commands,
    map_query: Query<(Entity, &TiledMap), Without<LayersInMap>>,
) {
    for (map_entity, tiled_map) in &map_query {
        let load_state = asset_server.get_recursive_dependency_load_state(&tiled_map.handle);
        match load_state {
            Some(RecursiveDependencyLoadState::Loaded) => {}
            Some(RecursiveDependencyLoadState::Failed(error)) => {
                error!("Map for entity {:?} failed to load: {}", map_entity, error);
                commands.entity(map_entity).insert(LayersInMap::default());
                continue;
            }
            _ => continue,
        }

        let Some(map_asset) = map_assets.get(&tiled_map.handle) else {
            warn!("Map asset loaded but not found in Assets resource!");
            continue;
        };

        let map_name = asset_server
            .get_path(&tiled_map.handle)
            .and_then(|p| {
                p.path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Map".to_string());

        info!("Spawning map hierarchy for '{}'", map_name);

        commands
            .entity(map_entity)
            .insert(Name::new(format!("Map: {}", map_name)));

        let context = SpawnContext::new(map_asset, &z_config);
        spawn_map(&mut commands, map_entity, &context);

        commands
            .entity(map_entity)
            .trigger(|entity| MapSpawned { entity });
    }
}

/// Spawns the levels of every `LdtkWorld` whose project and tileset images
/// have finished loading.
///
/// Runs in `PreUpdate` before user systems.
pub fn process_loaded_ldtk_worlds(
    asset_server: Res<AssetServer>,
    project_assets: Res<Assets<LdtkProjectAsset>>,
    z_config: Res<LayerZConfig>,
    mut commands: Commands,
    world_query: Query<(Entity, &LdtkWorld), Without<LevelsInWorld>>,
) {
    for (world_entity, ldtk_world) in &world_query {
        let load_state = asset_server.get_recursive_dependency_load_state(&ldtk_world.handle);
        match load_state {
            Some(RecursiveDependencyLoadState::Loaded) => {}
            Some(RecursiveDependencyLoadState::Failed(error)) => {
                error!("LDtk project for entity {:?} failed to load: {}", world_entity, error);
                commands.entity(world_entity).insert(LevelsInWorld::default());
                continue;
            }
            _ => continue,
        }

        let Some(asset) = project_assets.get(&ldtk_world.handle) else {
            warn!("LDtk project loaded but not found in Assets resource!");
            continue;
        };

        let Some(world) = asset.project.world(&ldtk_world.world) else {
            error!(
                "LDtk project has no world '{}' (available: {:?})",
                ldtk_world.world,
                asset
                    .project
                    .worlds
                    .iter()
                    .map(|w| w.identifier.as_str())
                    .collect::<Vec<_>>()
            );
            commands.entity(world_entity).insert(LevelsInWorld::default());
            continue;
        };

        info!(
            "Spawning LDtk world '{}' ({} levels)",
            world.identifier,
            world.levels.len()
        );

        commands
            .entity(world_entity)
            .insert(Name::new(format!("World: {}", world.identifier)));

        let levels = spawn_ldtk_world(&mut commands, world_entity, asset, world, &z_config);
        commands.entity(world_entity).insert(LevelsInWorld(levels));

        commands
            .entity(world_entity)
            .trigger(|entity| LdtkWorldSpawned { entity });
    }
}
