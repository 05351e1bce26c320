//! The LDtk shooter scene: a platformer player who picks up a gun and shoots
//! patrolling enemies.

use bevy::input::gamepad::GamepadButton;
use bevy::prelude::*;
use fortloop_assets::ldtk::EntityRef;
use fortloop_assets::prelude::LdtkProjectAsset;
use fortloop_core::prelude::*;
use serde::Deserialize;

use crate::behavior::{AttachBehaviorExt, Behavior, BehaviorContext};
use crate::camera::CameraTarget;
use crate::caveman::{MotorBindings, drive_body, read_motor_input};
use crate::combat::{Bullet, CombatRoster, Enemy};
use crate::config::{CavemanTuning, CombatConfig, GameConfig};
use crate::input::{ButtonHandle, ButtonNode, VirtualButton, VirtualInputs};
use crate::physics::{
    BoxCollider, CollisionState, LevelCollision, LevelPosition, SolidGrid, TriggerTracker,
    Velocity, collision::intersects,
};
use crate::render::ldtk_entity_sprite;

pub const PLAYER_ENTITY: &str = "Player";
pub const ENEMY_ENTITY: &str = "Enemy";
pub const GUN_ENTITY: &str = "Gun_Pickup";
pub const REF_TEST_ENTITY: &str = "RefTest";
/// IntGrid layer the player collides with.
pub const COLLISION_LAYER: &str = "Collisions";

/// Muzzle offset from the pivot when facing right and when facing left.
const MUZZLE_RIGHT: Vec2 = Vec2::new(7.0, -5.5);
const MUZZLE_LEFT: Vec2 = Vec2::new(-23.0, -5.5);
const GUN_BOB_SPEED: f32 = 4.0;
const GUN_BOB_HEIGHT: f32 = 2.0;
const BULLET_COLOR: Color = Color::srgb(1.0, 0.85, 0.3);
const BULLET_Z: f32 = 20.0;

/// Marks the player driven by [`ShooterPlayer`].
#[derive(Component, Debug, Default)]
pub struct Gunslinger;

/// The player has picked up the gun.
#[derive(Component, Debug, Default)]
pub struct Armed;

/// A gun floating in place until the player touches it.
#[derive(Component, Debug, Clone, Copy)]
pub struct GunPickup {
    pub anchor: Vec2,
    pub elapsed: f32,
}

impl GunPickup {
    pub fn new(anchor: Vec2) -> Self {
        Self {
            anchor,
            elapsed: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.anchor + Vec2::new(0.0, (self.elapsed * GUN_BOB_SPEED).sin() * GUN_BOB_HEIGHT)
    }
}

/// Identifier of the level the player is in.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct CurrentLevel(pub Option<String>);

/// Level custom fields logged at startup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LevelNotes {
    #[serde(rename = "Float")]
    pub float: Option<f64>,
    #[serde(rename = "Multilines")]
    pub multilines: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RefTestFields {
    #[serde(rename = "Test")]
    test: Option<EntityRef>,
}

/// Where a bullet leaves the gun.
pub fn muzzle_position(center: Vec2, pivot_offset: Vec2, facing_left: bool) -> Vec2 {
    let muzzle = if facing_left { MUZZLE_LEFT } else { MUZZLE_RIGHT };
    center + pivot_offset + muzzle
}

/// Platformer motor plus a gun.
#[derive(Debug, Default)]
pub struct ShooterPlayer {
    bindings: Option<MotorBindings>,
    shoot: Option<ButtonHandle>,
    /// Editor pivot relative to the collider centre
    pivot_offset: Vec2,
    facing_left: bool,
}

impl ShooterPlayer {
    pub fn new(pivot_offset: Vec2) -> Self {
        Self {
            pivot_offset,
            ..default()
        }
    }

    fn fire(&self, world: &mut World, center: Vec2) {
        let config = world
            .get_resource::<CombatConfig>()
            .copied()
            .unwrap_or_default();
        let origin = muzzle_position(center, self.pivot_offset, self.facing_left);
        let render = level_to_render(origin);

        let bullet = world
            .spawn((
                Bullet::new(self.facing_left),
                LevelPosition(origin),
                BoxCollider {
                    offset: Vec2::ZERO,
                    size: config.bullet_size,
                },
                Sprite::from_color(BULLET_COLOR, config.bullet_size),
                Transform::from_xyz(render.x, render.y, BULLET_Z),
                Name::new("Bullet"),
            ))
            .id();
        world
            .get_resource_or_insert_with(CombatRoster::default)
            .bullets
            .push(bullet);
    }
}

impl Behavior for ShooterPlayer {
    fn on_attach(&mut self, ctx: &mut BehaviorContext) {
        let mut inputs = ctx.world.get_resource_or_insert_with(VirtualInputs::default);
        self.bindings = Some(MotorBindings::register(&mut inputs));
        self.shoot = Some(inputs.register_button(VirtualButton::new([
            ButtonNode::Key(KeyCode::KeyX),
            ButtonNode::Gamepad(GamepadButton::West),
        ])));

        ctx.world.entity_mut(ctx.entity).insert((
            Gunslinger,
            CollisionState::default(),
            TriggerTracker::default(),
        ));
    }

    fn on_update(&mut self, ctx: &mut BehaviorContext) {
        let dt = ctx.delta_secs();
        let tuning = ctx
            .world
            .get_resource::<CavemanTuning>()
            .copied()
            .unwrap_or_default();
        let input = read_motor_input(ctx.world, self.bindings);
        let shoot = match (self.shoot, ctx.world.get_resource::<VirtualInputs>()) {
            (Some(shoot), Some(inputs)) => inputs.is_pressed(shoot),
            _ => false,
        };

        let Some(step) = drive_body(ctx.world, ctx.entity, &tuning, input, dt) else {
            return;
        };
        if let Some(flip) = step.flip {
            self.facing_left = flip;
        }
        if let Some(mut sprite) = ctx.world.get_mut::<Sprite>(ctx.entity) {
            sprite.flip_x = self.facing_left;
        }

        if shoot
            && ctx.world.get::<Armed>(ctx.entity).is_some()
            && let Some(center) = ctx.world.get::<LevelPosition>(ctx.entity).map(|p| p.0)
        {
            self.fire(ctx.world, center);
        }
    }

    fn on_detach(&mut self, ctx: &mut BehaviorContext) {
        let Some(mut inputs) = ctx.world.get_resource_mut::<VirtualInputs>() else {
            return;
        };
        if let Some(bindings) = self.bindings.take() {
            bindings.deregister(&mut inputs);
        }
        if let Some(shoot) = self.shoot.take() {
            inputs.deregister_button(shoot);
        }
    }
}

pub fn setup_shooter(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    commands.spawn(Camera2d);
    commands.spawn((
        LdtkWorld::new(
            asset_server.load(config.ldtk_project_path.clone()),
            config.ldtk_world.clone(),
        ),
        Name::new("Shooter world"),
    ));
    info!(
        "Loading world '{}' from '{}'",
        config.ldtk_world, config.ldtk_project_path
    );
}

/// Turns LDtk entity instances into the player, enemies and the gun.
pub fn on_shooter_entity(
    trigger: On<LdtkEntitySpawned>,
    entities: Query<&LdtkEntity>,
    worlds: Query<&LdtkWorld>,
    projects: Res<Assets<LdtkProjectAsset>>,
    mut roster: ResMut<CombatRoster>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let Ok(instance) = entities.get(event.entity) else {
        return;
    };
    let center = instance.bounds().center();
    let collider = BoxCollider {
        offset: Vec2::ZERO,
        size: instance.size,
    };

    let mut entity = commands.entity(event.entity);
    if let Some(sprite) = worlds
        .get(event.world_entity)
        .ok()
        .and_then(|world| projects.get(&world.handle))
        .and_then(|asset| ldtk_entity_sprite(asset, instance))
    {
        entity.insert(sprite);
    }

    match instance.identifier.as_str() {
        PLAYER_ENTITY => {
            entity
                .insert((
                    LevelPosition(center),
                    Velocity::default(),
                    collider,
                    CameraTarget,
                ))
                .attach_behavior(ShooterPlayer::new(instance.position - center));
            info!("Player spawned at {}", center);
        }
        ENEMY_ENTITY => {
            entity.insert((Enemy::default(), LevelPosition(center), collider));
            roster.enemies.push(event.entity);
        }
        GUN_ENTITY => {
            entity.insert((GunPickup::new(center), LevelPosition(center), collider));
        }
        _ => {}
    }
}

/// Collision grids come from the `Collisions` IntGrid layer of every level.
pub fn on_shooter_int_grid(
    trigger: On<IntGridLayerSpawned>,
    layers: Query<&IntGridData>,
    mut collision: ResMut<LevelCollision>,
) {
    let event = trigger.event();
    if event.identifier != COLLISION_LAYER {
        return;
    }
    let Ok(grid) = layers.get(event.entity) else {
        return;
    };
    collision.grids.push(SolidGrid::new(
        grid.origin,
        Vec2::splat(grid.cell_size),
        grid.width,
        grid.height,
        grid.solid_mask(),
    ));
}

/// Logs level notes and entity references once the world is up, and takes
/// the clear colour from the project.
pub fn on_shooter_world_spawned(
    trigger: On<LdtkWorldSpawned>,
    worlds: Query<&LdtkWorld>,
    projects: Res<Assets<LdtkProjectAsset>>,
    mut commands: Commands,
) {
    let Some(asset) = worlds
        .get(trigger.event().entity)
        .ok()
        .and_then(|world| projects.get(&world.handle))
    else {
        return;
    };
    let project = &asset.project;

    if let Some([r, g, b]) = project.background_color() {
        commands.insert_resource(ClearColor(Color::srgb_u8(r, g, b)));
    }

    for world in &project.worlds {
        for level in &world.levels {
            match level.fields::<LevelNotes>() {
                Ok(notes) if notes.float.is_some() || notes.multilines.is_some() => {
                    info!("Level '{}' notes: {:?}", level.identifier, notes);
                }
                Ok(_) => {}
                Err(err) => warn!("Level '{}' fields: {}", level.identifier, err),
            }
        }

        for (level, instance) in world.entities(REF_TEST_ENTITY) {
            let Ok(RefTestFields {
                test: Some(reference),
            }) = instance.fields::<RefTestFields>()
            else {
                continue;
            };
            match project.entity_ref(&reference) {
                Some(target) => info!(
                    "{} in '{}' refers to {} ({})",
                    REF_TEST_ENTITY, level.identifier, target.identifier, target.iid
                ),
                None => warn!(
                    "{} in '{}' refers to missing entity {}",
                    REF_TEST_ENTITY, level.identifier, reference.entity_iid
                ),
            }
        }
    }
}

/// Bobs every gun pickup around its anchor.
pub fn bob_gun_pickups(time: Res<Time>, mut guns: Query<(&mut GunPickup, &mut LevelPosition)>) {
    for (mut gun, mut position) in &mut guns {
        gun.elapsed += time.delta_secs();
        position.0 = gun.position();
    }
}

/// Arms the player on touching a gun pickup.
pub fn collect_gun(
    players: Query<(Entity, &LevelPosition, &BoxCollider), (With<Gunslinger>, Without<Armed>)>,
    guns: Query<(Entity, &LevelPosition, &BoxCollider), With<GunPickup>>,
    mut commands: Commands,
) {
    for (player, player_position, player_box) in &players {
        let bounds = player_box.bounds(player_position.0);
        let Some((gun, ..)) = guns
            .iter()
            .find(|(_, position, collider)| intersects(bounds, collider.bounds(position.0)))
        else {
            continue;
        };
        commands.entity(gun).despawn();
        commands.entity(player).insert(Armed);
        info!("Picked up the gun");
    }
}

/// Keeps [`CurrentLevel`] on the first level containing the player.
pub fn track_current_level(
    players: Query<&LevelPosition, With<Gunslinger>>,
    worlds: Query<&LevelsInWorld>,
    levels: Query<(&LdtkLevel, &LevelGeometry)>,
    mut current: ResMut<CurrentLevel>,
) {
    let Some(player) = players.iter().next() else {
        return;
    };
    let found = worlds
        .iter()
        .flat_map(|world| world.0.iter())
        .filter_map(|entity| levels.get(*entity).ok())
        .find(|(_, geometry)| geometry.contains(player.0))
        .map(|(level, _)| level.identifier.clone());

    if found.is_some() && current.0 != found {
        info!("Entered level {:?}", found);
        current.0 = found;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muzzle_position_follows_facing() {
        let center = Vec2::new(100.0, 50.0);
        let pivot = Vec2::new(0.0, 8.0);
        assert_eq!(muzzle_position(center, pivot, false), Vec2::new(107.0, 52.5));
        assert_eq!(muzzle_position(center, pivot, true), Vec2::new(77.0, 52.5));
    }

    #[test]
    fn test_gun_bobs_around_anchor() {
        let mut gun = GunPickup::new(Vec2::new(10.0, 10.0));
        assert_eq!(gun.position(), Vec2::new(10.0, 10.0));
        gun.elapsed = std::f32::consts::FRAC_PI_8;
        let position = gun.position();
        assert!((position.y - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_current_level_is_first_containing_player() {
        let mut world = World::new();
        world.init_resource::<CurrentLevel>();

        let level = |world: &mut World, identifier: &str, min: Vec2| {
            world
                .spawn((
                    LdtkLevel {
                        identifier: identifier.into(),
                        iid: identifier.into(),
                    },
                    LevelGeometry::at(min, 4, 4, 16.0, 16.0),
                ))
                .id()
        };
        let a = level(&mut world, "Level_0", Vec2::ZERO);
        let b = level(&mut world, "Level_1", Vec2::new(64.0, 0.0));
        world.spawn(LevelsInWorld(vec![a, b]));
        let player = world
            .spawn((Gunslinger, LevelPosition(Vec2::new(70.0, 10.0))))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(track_current_level);
        schedule.run(&mut world);
        assert_eq!(world.resource::<CurrentLevel>().0.as_deref(), Some("Level_1"));

        // Outside every level keeps the last one.
        world.entity_mut(player).insert(LevelPosition(Vec2::new(-50.0, 10.0)));
        schedule.run(&mut world);
        assert_eq!(world.resource::<CurrentLevel>().0.as_deref(), Some("Level_1"));
    }

    #[test]
    fn test_gun_pickup_arms_player() {
        let mut world = World::new();
        let player = world
            .spawn((
                Gunslinger,
                LevelPosition(Vec2::new(16.0, 16.0)),
                BoxCollider::new(16.0, 32.0),
            ))
            .id();
        let gun = world
            .spawn((
                GunPickup::new(Vec2::new(20.0, 20.0)),
                LevelPosition(Vec2::new(20.0, 20.0)),
                BoxCollider::new(8.0, 8.0),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(collect_gun);
        schedule.run(&mut world);

        assert!(world.get::<Armed>(player).is_some());
        assert!(world.get_entity(gun).is_err());
    }
}
