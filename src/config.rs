//! Game configuration resources.

use bevy::prelude::*;

use crate::physics::HitTest;

/// Which scene the game boots into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum GameScene {
    /// Tiled map with the Caveman, items and danger zones
    #[default]
    TiledPlatformer,
    /// LDtk world with the gun-toting player and enemies
    LdtkShooter,
}

/// Top-level settings for the game plugin.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct GameConfig {
    pub scene: GameScene,
    /// Relative to the asset folder
    pub tiled_map_path: String,
    pub ldtk_project_path: String,
    /// World iid or identifier inside the LDtk project
    pub ldtk_world: String,
    pub caveman_atlas_path: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            scene: GameScene::default(),
            tiled_map_path: "platformer/tiledMap.tmx".to_string(),
            ldtk_project_path: "fortloop/world.ldtk".to_string(),
            ldtk_world: "World".to_string(),
            caveman_atlas_path: "platformer/caveman.png".to_string(),
        }
    }
}

/// Platformer motor constants, in level pixels and seconds.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct CavemanTuning {
    pub move_speed: f32,
    pub gravity: f32,
    pub jump_height: f32,
}

impl Default for CavemanTuning {
    fn default() -> Self {
        Self {
            move_speed: 150.0,
            gravity: 1000.0,
            jump_height: 80.0,
        }
    }
}

impl CavemanTuning {
    /// Upward take-off speed that peaks at `jump_height`.
    pub fn jump_velocity(&self) -> f32 {
        -(2.0 * self.jump_height * self.gravity).sqrt()
    }
}

/// Bullet and enemy constants for the shooter scene.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct CombatConfig {
    pub bullet_speed: f32,
    /// Seconds before an unmatched bullet is removed
    pub bullet_lifetime: f32,
    pub bullet_size: Vec2,
    pub enemy_speed: f32,
    /// Seconds between patrol turns
    pub enemy_turn_interval: f32,
    /// Seconds from the kill to removal
    pub death_duration: f32,
    pub hit_test: HitTest,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            bullet_speed: 360.0,
            bullet_lifetime: 1.5,
            bullet_size: Vec2::new(6.0, 3.0),
            enemy_speed: 30.0,
            enemy_turn_interval: 2.0,
            death_duration: 0.6,
            hit_test: HitTest::Intersects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_velocity() {
        let tuning = CavemanTuning::default();
        assert_eq!(tuning.jump_velocity(), -400.0);
    }
}
