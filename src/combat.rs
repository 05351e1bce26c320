//! Bullets against enemies.
//!
//! Each frame every live enemy and bullet advances, then bullets are matched
//! against enemies. Matched bullets are removed and their enemy starts
//! dying; removal of both kinds happens in one compaction pass after the
//! scan so indices never shift while it runs.

use bevy::prelude::*;

use crate::config::CombatConfig;
use crate::physics::{BoxCollider, HitTest, LevelPosition};

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum EnemyState {
    /// Patrolling horizontally
    Alive { direction: f32, turn_timer: f32 },
    /// Playing out the death fade
    Dying { elapsed: f32 },
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Enemy {
    pub state: EnemyState,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            state: EnemyState::Alive {
                direction: 1.0,
                turn_timer: 0.0,
            },
        }
    }
}

impl Enemy {
    /// Step the enemy, returning how far it moved.
    pub fn advance(&mut self, dt: f32, config: &CombatConfig) -> Vec2 {
        match &mut self.state {
            EnemyState::Alive {
                direction,
                turn_timer,
            } => {
                let motion = Vec2::new(*direction * config.enemy_speed * dt, 0.0);
                *turn_timer += dt;
                if *turn_timer >= config.enemy_turn_interval {
                    *turn_timer -= config.enemy_turn_interval;
                    *direction = -*direction;
                }
                motion
            }
            EnemyState::Dying { elapsed } => {
                *elapsed += dt;
                Vec2::ZERO
            }
        }
    }

    /// Start dying. Killing a dying enemy does nothing.
    pub fn kill(&mut self, dt: f32) {
        if let EnemyState::Alive { .. } = self.state {
            self.state = EnemyState::Dying { elapsed: dt };
        }
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, EnemyState::Dying { .. })
    }

    /// The death has played out and the enemy can be removed.
    pub fn is_dead(&self, config: &CombatConfig) -> bool {
        match self.state {
            EnemyState::Dying { elapsed } => elapsed >= config.death_duration,
            EnemyState::Alive { .. } => false,
        }
    }

    /// Sprite opacity: fades out while dying.
    pub fn alpha(&self, config: &CombatConfig) -> f32 {
        match self.state {
            EnemyState::Dying { elapsed } if config.death_duration > 0.0 => {
                (1.0 - elapsed / config.death_duration).clamp(0.0, 1.0)
            }
            EnemyState::Dying { .. } => 0.0,
            EnemyState::Alive { .. } => 1.0,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Bullet {
    /// -1 left, 1 right
    pub direction: f32,
    pub age: f32,
}

impl Bullet {
    pub fn new(facing_left: bool) -> Self {
        Self {
            direction: if facing_left { -1.0 } else { 1.0 },
            age: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32, config: &CombatConfig) -> Vec2 {
        self.age += dt;
        Vec2::new(self.direction * config.bullet_speed * dt, 0.0)
    }

    pub fn is_expired(&self, config: &CombatConfig) -> bool {
        self.age >= config.bullet_lifetime
    }
}

/// Live enemies and bullets in scan order.
#[derive(Resource, Debug, Clone, Default)]
pub struct CombatRoster {
    pub enemies: Vec<Entity>,
    pub bullets: Vec<Entity>,
}

/// A bullet index matched to an enemy index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub bullet: usize,
    pub enemy: usize,
}

/// Match bullets to enemies, both scanned from the back.
///
/// Each bullet takes the first enemy it hits and stops. `None` entries are
/// skipped. Enemies can be hit by more than one bullet.
pub fn scan_hits(
    bullets: &[Option<Rect>],
    enemies: &[Option<Rect>],
    hit_test: HitTest,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (bullet, bullet_box) in bullets.iter().enumerate().rev() {
        let Some(bullet_box) = bullet_box else {
            continue;
        };
        let matched = enemies.iter().enumerate().rev().find(|(_, enemy_box)| {
            enemy_box.is_some_and(|enemy_box| hit_test.test(*bullet_box, enemy_box))
        });
        if let Some((enemy, _)) = matched {
            hits.push(Hit { bullet, enemy });
        }
    }
    hits
}

/// Drop entries whose flag is set, keeping order.
pub fn compact<T>(items: &mut Vec<T>, removed: &[bool]) {
    let mut flags = removed.iter();
    items.retain(|_| !flags.next().copied().unwrap_or(false));
}

/// Advance, match and remove bullets and enemies.
pub fn update_combat(
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut roster: ResMut<CombatRoster>,
    mut enemies: Query<
        (&mut Enemy, &mut LevelPosition, &BoxCollider, Option<&mut Sprite>),
        Without<Bullet>,
    >,
    mut bullets: Query<(&mut Bullet, &mut LevelPosition, &BoxCollider), Without<Enemy>>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    let roster = &mut *roster;

    let mut enemy_removed = vec![false; roster.enemies.len()];
    let mut enemy_boxes = Vec::with_capacity(roster.enemies.len());
    for (index, entity) in roster.enemies.iter().enumerate() {
        let Ok((mut enemy, mut position, collider, sprite)) = enemies.get_mut(*entity) else {
            enemy_removed[index] = true;
            enemy_boxes.push(None);
            continue;
        };
        position.0 += enemy.advance(dt, &config);
        if enemy.is_dead(&config) {
            enemy_removed[index] = true;
            enemy_boxes.push(None);
            commands.entity(*entity).despawn();
            continue;
        }
        if let Some(mut sprite) = sprite {
            sprite.color.set_alpha(enemy.alpha(&config));
        }
        enemy_boxes.push(Some(collider.bounds(position.0)));
    }

    let mut bullet_removed = vec![false; roster.bullets.len()];
    let mut bullet_boxes = Vec::with_capacity(roster.bullets.len());
    for (index, entity) in roster.bullets.iter().enumerate() {
        let Ok((mut bullet, mut position, collider)) = bullets.get_mut(*entity) else {
            bullet_removed[index] = true;
            bullet_boxes.push(None);
            continue;
        };
        position.0 += bullet.advance(dt, &config);
        if bullet.is_expired(&config) {
            bullet_removed[index] = true;
            bullet_boxes.push(None);
            commands.entity(*entity).despawn();
            continue;
        }
        bullet_boxes.push(Some(collider.bounds(position.0)));
    }

    for hit in scan_hits(&bullet_boxes, &enemy_boxes, config.hit_test) {
        bullet_removed[hit.bullet] = true;
        commands.entity(roster.bullets[hit.bullet]).despawn();
        if let Ok((mut enemy, ..)) = enemies.get_mut(roster.enemies[hit.enemy]) {
            if !enemy.is_dying() {
                debug!("Enemy {} hit", roster.enemies[hit.enemy]);
            }
            enemy.kill(dt);
        }
    }

    compact(&mut roster.enemies, &enemy_removed);
    compact(&mut roster.bullets, &bullet_removed);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    fn rect(x: f32, y: f32) -> Option<Rect> {
        Some(Rect::from_center_size(Vec2::new(x, y), Vec2::splat(10.0)))
    }

    #[test]
    fn test_each_bullet_takes_the_last_enemy_it_hits() {
        let bullets = [rect(0.0, 0.0), rect(100.0, 0.0)];
        let enemies = [rect(2.0, 0.0), rect(4.0, 0.0), rect(200.0, 0.0)];

        let hits = scan_hits(&bullets, &enemies, HitTest::Intersects);
        assert_eq!(hits, vec![Hit { bullet: 0, enemy: 1 }]);
    }

    #[test]
    fn test_two_bullets_one_enemy() {
        let bullets = [rect(0.0, 0.0), rect(1.0, 0.0)];
        let enemies = [rect(2.0, 0.0)];

        let hits = scan_hits(&bullets, &enemies, HitTest::Intersects);
        assert_eq!(
            hits,
            vec![Hit { bullet: 1, enemy: 0 }, Hit { bullet: 0, enemy: 0 }]
        );
    }

    #[test]
    fn test_contains_mode_needs_enclosure() {
        let small = Some(Rect::from_center_size(Vec2::ZERO, Vec2::splat(4.0)));
        let large = Some(Rect::from_center_size(Vec2::ZERO, Vec2::splat(20.0)));

        assert!(scan_hits(&[small], &[large], HitTest::Contains).is_empty());
        assert_eq!(scan_hits(&[large], &[small], HitTest::Contains).len(), 1);
        assert_eq!(scan_hits(&[small], &[large], HitTest::Intersects).len(), 1);
    }

    #[test]
    fn test_compact_keeps_order() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        compact(&mut items, &[false, true, false, true]);
        assert_eq!(items, vec!['a', 'c']);
    }

    #[test]
    fn test_kill_is_idempotent() {
        let config = CombatConfig::default();
        let mut enemy = Enemy::default();
        enemy.kill(0.1);
        enemy.advance(0.2, &config);
        enemy.kill(0.1);
        assert_eq!(enemy.state, EnemyState::Dying { elapsed: 0.1 + 0.2 });
        assert!(!enemy.is_dead(&config));

        enemy.advance(0.4, &config);
        assert!(enemy.is_dead(&config));
    }

    #[test]
    fn test_patrol_turns() {
        let config = CombatConfig::default();
        let mut enemy = Enemy::default();
        assert_eq!(enemy.advance(1.0, &config), Vec2::new(30.0, 0.0));
        assert_eq!(enemy.advance(1.0, &config), Vec2::new(30.0, 0.0));
        assert_eq!(enemy.advance(1.0, &config), Vec2::new(-30.0, 0.0));
    }

    #[test]
    fn test_update_removes_bullet_and_kills_only_the_hit_enemy() {
        let mut world = World::new();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_millis(10));
        world.insert_resource(time);
        world.insert_resource(CombatConfig::default());

        let enemy = world
            .spawn((
                Enemy::default(),
                LevelPosition(Vec2::new(50.0, 0.0)),
                BoxCollider::new(16.0, 16.0),
            ))
            .id();
        let bystander = world
            .spawn((
                Enemy::default(),
                LevelPosition(Vec2::new(300.0, 0.0)),
                BoxCollider::new(16.0, 16.0),
            ))
            .id();
        let near = world
            .spawn((
                Bullet::new(false),
                LevelPosition(Vec2::new(45.0, 0.0)),
                BoxCollider::new(6.0, 3.0),
            ))
            .id();
        let far = world
            .spawn((
                Bullet::new(false),
                LevelPosition(Vec2::new(-200.0, 0.0)),
                BoxCollider::new(6.0, 3.0),
            ))
            .id();
        world.insert_resource(CombatRoster {
            enemies: vec![enemy, bystander],
            bullets: vec![near, far],
        });

        world.run_system_once(update_combat).expect("combat system runs");

        let roster = world.resource::<CombatRoster>();
        assert_eq!(roster.bullets, vec![far]);
        assert_eq!(roster.enemies, vec![enemy, bystander]);
        assert!(world.get_entity(near).is_err());
        assert!(world.get::<Enemy>(enemy).is_some_and(Enemy::is_dying));
        assert!(
            world
                .get::<Enemy>(bystander)
                .is_some_and(|e| matches!(e.state, EnemyState::Alive { .. }))
        );
    }
}
