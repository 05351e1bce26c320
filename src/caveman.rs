//! The Caveman: a platformer motor with input, gravity, swept collision and
//! animation selection.
//!
//! The motor itself is split into pure steps ([`begin_step`] and
//! [`finish_step`]) so its rules can be exercised without a world.
//! [`drive_body`] wires them to the ECS and is shared with the shooter player.

use bevy::input::gamepad::GamepadButton;
use bevy::prelude::*;

use crate::animation::{AnimationClip, AnimationLabel, SpriteAnimator};
use crate::behavior::{Behavior, BehaviorContext};
use crate::config::CavemanTuning;
use crate::input::{
    AxisHandle, AxisNode, ButtonHandle, ButtonNode, OverlapBehavior, VirtualButton,
    VirtualInputs, VirtualIntegerAxis,
};
use crate::physics::{
    BoxCollider, CollisionState, LevelCollision, LevelPosition, Mover, TriggerEntered,
    TriggerExited, TriggerTracker, Velocity, overlapping_triggers,
};

/// Input for one motor step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorInput {
    /// Horizontal axis, -1, 0 or 1
    pub x: i32,
    /// Jump went down this frame
    pub jump_pressed: bool,
}

/// Outcome of [`begin_step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorStep {
    pub velocity: Vec2,
    /// Animation the body should show, if the rules picked one
    pub animation: Option<AnimationLabel>,
    /// Facing left, if the input changed it
    pub flip: Option<bool>,
}

/// What the animation rules look at.
#[derive(Debug, Clone, Copy)]
struct AnimationFacts {
    x: i32,
    grounded: bool,
    jump_pressed: bool,
    vertical: f32,
}

struct AnimationRule {
    label: AnimationLabel,
    applies: fn(&AnimationFacts) -> bool,
}

/// Later rules override earlier ones.
const ANIMATION_RULES: [AnimationRule; 4] = [
    AnimationRule {
        label: AnimationLabel::Run,
        applies: |facts| facts.grounded && facts.x != 0,
    },
    AnimationRule {
        label: AnimationLabel::Idle,
        applies: |facts| facts.grounded && facts.x == 0,
    },
    AnimationRule {
        label: AnimationLabel::Jumping,
        applies: |facts| facts.grounded && facts.jump_pressed,
    },
    AnimationRule {
        label: AnimationLabel::Falling,
        applies: |facts| !facts.grounded && facts.vertical > 0.0,
    },
];

fn select_animation(facts: &AnimationFacts) -> Option<AnimationLabel> {
    ANIMATION_RULES
        .iter()
        .rev()
        .find(|rule| (rule.applies)(facts))
        .map(|rule| rule.label)
}

/// Apply input, jump and gravity to `velocity` and pick an animation.
///
/// `state` is the collision state left by the previous move.
pub fn begin_step(
    tuning: &CavemanTuning,
    input: MotorInput,
    state: &CollisionState,
    velocity: Vec2,
    dt: f32,
) -> MotorStep {
    let grounded = state.below;
    let mut velocity = velocity;

    velocity.x = input.x.signum() as f32 * tuning.move_speed;
    let flip = match input.x.signum() {
        -1 => Some(true),
        1 => Some(false),
        _ => None,
    };

    if grounded && input.jump_pressed {
        velocity.y = tuning.jump_velocity();
    }

    let animation = select_animation(&AnimationFacts {
        x: input.x,
        grounded,
        jump_pressed: input.jump_pressed,
        vertical: velocity.y,
    });

    velocity.y += tuning.gravity * dt;

    MotorStep {
        velocity,
        animation,
        flip,
    }
}

/// Landing stops vertical motion.
pub fn finish_step(state: &CollisionState, velocity: Vec2) -> Vec2 {
    if state.below {
        Vec2::new(velocity.x, 0.0)
    } else {
        velocity
    }
}

/// Run one motor step on `entity` and report trigger edges.
///
/// The entity needs `LevelPosition`, `Velocity` and `BoxCollider`. Returns
/// `None` when any of them is missing.
pub fn drive_body(
    world: &mut World,
    entity: Entity,
    tuning: &CavemanTuning,
    input: MotorInput,
    dt: f32,
) -> Option<MotorStep> {
    let collider = *world.get::<BoxCollider>(entity)?;
    let position = world.get::<LevelPosition>(entity)?.0;
    let velocity = world.get::<Velocity>(entity)?.0;
    let mut state = world
        .get::<CollisionState>(entity)
        .copied()
        .unwrap_or_default();

    let step = begin_step(tuning, input, &state, velocity, dt);
    let motion = step.velocity * dt;
    let bounds = collider.bounds(position);
    let applied = match world.get_resource::<LevelCollision>() {
        Some(collision) => collision.mover().move_body(motion, bounds, &mut state),
        None => {
            state.clear();
            motion
        }
    };
    let position = position + applied;
    let velocity = finish_step(&state, step.velocity);

    world
        .entity_mut(entity)
        .insert((LevelPosition(position), Velocity(velocity), state));

    let overlapping = overlapping_triggers(world, collider.bounds(position));
    let changes = world
        .get_mut::<TriggerTracker>(entity)
        .map(|mut tracker| tracker.update(&overlapping))
        .unwrap_or_default();
    for trigger in changes.exited {
        world.trigger(TriggerExited {
            body: entity,
            trigger,
        });
    }
    for trigger in changes.entered {
        world.trigger(TriggerEntered {
            body: entity,
            trigger,
        });
    }

    Some(step)
}

/// Jump button and horizontal axis shared by platformer players.
#[derive(Debug, Clone, Copy)]
pub struct MotorBindings {
    pub jump: ButtonHandle,
    pub x: AxisHandle,
}

impl MotorBindings {
    /// Z / pad South to jump; d-pad, left stick, then arrow keys to move.
    pub fn register(inputs: &mut VirtualInputs) -> Self {
        let jump = inputs.register_button(VirtualButton::new([
            ButtonNode::Key(KeyCode::KeyZ),
            ButtonNode::Gamepad(GamepadButton::South),
        ]));
        let x = inputs.register_axis(VirtualIntegerAxis::new([
            AxisNode::GamepadDpadLeftRight,
            AxisNode::left_stick_x(),
            AxisNode::keyboard_keys(
                OverlapBehavior::TakeNewer,
                KeyCode::ArrowLeft,
                KeyCode::ArrowRight,
            ),
        ]));
        Self { jump, x }
    }

    pub fn deregister(self, inputs: &mut VirtualInputs) {
        inputs.deregister_button(self.jump);
        inputs.deregister_axis(self.x);
    }

    pub fn read(&self, inputs: &VirtualInputs) -> MotorInput {
        MotorInput {
            x: inputs.axis(self.x),
            jump_pressed: inputs.is_pressed(self.jump),
        }
    }
}

/// Read this frame's motor input, if the bindings are live.
pub(crate) fn read_motor_input(world: &World, bindings: Option<MotorBindings>) -> MotorInput {
    match (bindings, world.get_resource::<VirtualInputs>()) {
        (Some(bindings), Some(inputs)) => bindings.read(inputs),
        _ => MotorInput::default(),
    }
}

/// Clips for the 8-column, 32x32 caveman sheet.
pub fn caveman_animator() -> SpriteAnimator {
    SpriteAnimator::default()
        .with_clip(AnimationLabel::Walk, AnimationClip::row(0, 6))
        .with_clip(AnimationLabel::Run, AnimationClip::row(8, 7))
        .with_clip(AnimationLabel::Idle, AnimationClip::row(16, 1))
        .with_clip(AnimationLabel::Attack, AnimationClip::row(24, 4))
        .with_clip(AnimationLabel::Death, AnimationClip::row(40, 4).once())
        .with_clip(AnimationLabel::Falling, AnimationClip::row(48, 1))
        .with_clip(AnimationLabel::Hurt, AnimationClip::row(64, 2))
        .with_clip(AnimationLabel::Jumping, AnimationClip::row(72, 4).once())
}

/// Marks the player driven by [`Caveman`].
#[derive(Component, Debug, Default)]
pub struct CavemanPlayer;

/// Platformer player behavior.
#[derive(Debug, Default)]
pub struct Caveman {
    bindings: Option<MotorBindings>,
}

impl Behavior for Caveman {
    fn on_attach(&mut self, ctx: &mut BehaviorContext) {
        let mut inputs = ctx.world.get_resource_or_insert_with(VirtualInputs::default);
        self.bindings = Some(MotorBindings::register(&mut inputs));

        let mut animator = caveman_animator();
        animator.play(AnimationLabel::Idle);
        ctx.world.entity_mut(ctx.entity).insert((
            CavemanPlayer,
            animator,
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

        let Some(step) = drive_body(ctx.world, ctx.entity, &tuning, input, dt) else {
            return;
        };

        if let Some(mut animator) = ctx.world.get_mut::<SpriteAnimator>(ctx.entity) {
            if let Some(flip) = step.flip {
                animator.flip_x = flip;
            }
            if let Some(label) = step.animation
                && !animator.is_active(label)
            {
                animator.play(label);
            }
        }
    }

    fn on_detach(&mut self, ctx: &mut BehaviorContext) {
        if let Some(bindings) = self.bindings.take()
            && let Some(mut inputs) = ctx.world.get_resource_mut::<VirtualInputs>()
        {
            bindings.deregister(&mut inputs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::behavior::{BehaviorRegistry, run_behaviors};
    use crate::input::InputSnapshot;
    use crate::physics::SolidGrid;

    const DT: f32 = 1.0 / 60.0;

    fn grounded() -> CollisionState {
        CollisionState {
            below: true,
            ..default()
        }
    }

    fn step(input: MotorInput, state: CollisionState, velocity: Vec2) -> MotorStep {
        begin_step(&CavemanTuning::default(), input, &state, velocity, DT)
    }

    #[test]
    fn test_run_left_when_grounded() {
        let result = step(
            MotorInput {
                x: -1,
                jump_pressed: false,
            },
            grounded(),
            Vec2::ZERO,
        );
        assert_eq!(result.velocity.x, -150.0);
        assert_eq!(result.animation, Some(AnimationLabel::Run));
        assert_eq!(result.flip, Some(true));
    }

    #[test]
    fn test_idle_keeps_facing() {
        let result = step(MotorInput::default(), grounded(), Vec2::new(150.0, 0.0));
        assert_eq!(result.velocity.x, 0.0);
        assert_eq!(result.animation, Some(AnimationLabel::Idle));
        assert_eq!(result.flip, None);
    }

    #[test]
    fn test_jump_overrides_run() {
        let result = step(
            MotorInput {
                x: 1,
                jump_pressed: true,
            },
            grounded(),
            Vec2::ZERO,
        );
        assert_eq!(result.animation, Some(AnimationLabel::Jumping));
        assert_eq!(result.velocity.y, -400.0 + 1000.0 * DT);
        assert_eq!(result.flip, Some(false));
    }

    #[test]
    fn test_jump_needs_ground() {
        let result = step(
            MotorInput {
                x: 0,
                jump_pressed: true,
            },
            CollisionState::default(),
            Vec2::new(0.0, -100.0),
        );
        assert_eq!(result.velocity.y, -100.0 + 1000.0 * DT);
        // Rising in the air keeps whatever is playing
        assert_eq!(result.animation, None);
    }

    #[test]
    fn test_falling_overrides_run() {
        let result = step(
            MotorInput {
                x: 1,
                jump_pressed: false,
            },
            CollisionState::default(),
            Vec2::new(0.0, 50.0),
        );
        assert_eq!(result.animation, Some(AnimationLabel::Falling));
    }

    #[test]
    fn test_landing_zeroes_vertical_velocity() {
        assert_eq!(finish_step(&grounded(), Vec2::new(3.0, 90.0)), Vec2::new(3.0, 0.0));
        assert_eq!(
            finish_step(&CollisionState::default(), Vec2::new(3.0, 90.0)),
            Vec2::new(3.0, 90.0)
        );
    }

    fn floor_world() -> World {
        let mut world = World::new();
        world.init_resource::<VirtualInputs>();
        world.init_resource::<BehaviorRegistry>();
        world.insert_resource(CavemanTuning::default());
        world.insert_resource(LevelCollision {
            grids: vec![SolidGrid::new(
                Vec2::ZERO,
                Vec2::splat(16.0),
                4,
                4,
                (0..16).map(|i| i >= 12).collect(),
            )],
        });
        world
    }

    #[test]
    fn test_drive_body_lands_on_floor() {
        let mut world = floor_world();
        let body = world
            .spawn((
                LevelPosition(Vec2::new(32.0, 30.0)),
                Velocity(Vec2::new(0.0, 600.0)),
                BoxCollider::new(16.0, 32.0),
            ))
            .id();

        let result = drive_body(
            &mut world,
            body,
            &CavemanTuning::default(),
            MotorInput::default(),
            0.1,
        );
        assert!(result.is_some());
        // Feet were at 46, floor starts at 48
        assert_eq!(world.get::<LevelPosition>(body).map(|p| p.0), Some(Vec2::new(32.0, 32.0)));
        assert_eq!(world.get::<Velocity>(body).map(|v| v.0), Some(Vec2::ZERO));
        assert!(world.get::<CollisionState>(body).is_some_and(|s| s.below));
    }

    #[test]
    fn test_caveman_registers_and_releases_inputs() {
        let mut world = floor_world();
        let player = world
            .spawn((
                LevelPosition(Vec2::new(32.0, 32.0)),
                Velocity::default(),
                BoxCollider::new(16.0, 32.0),
            ))
            .id();

        BehaviorRegistry::attach(&mut world, player, Caveman::default());
        assert_eq!(world.resource::<VirtualInputs>().len(), 2);
        assert!(
            world
                .get::<SpriteAnimator>(player)
                .is_some_and(|animator| animator.is_active(AnimationLabel::Idle))
        );

        run_behaviors(&mut world);
        world.despawn(player);
        run_behaviors(&mut world);
        assert!(world.resource::<VirtualInputs>().is_empty());
    }

    #[test]
    fn test_same_animation_is_not_restarted() {
        let mut world = floor_world();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_millis(10));
        world.insert_resource(time);

        // Standing on the floor row
        let player = world
            .spawn((
                LevelPosition(Vec2::new(24.0, 32.0)),
                Velocity::default(),
                BoxCollider::new(16.0, 32.0),
            ))
            .id();
        BehaviorRegistry::attach(&mut world, player, Caveman::default());
        world.entity_mut(player).insert(grounded());

        world.resource_mut::<VirtualInputs>().update(&InputSnapshot {
            keys: [KeyCode::ArrowRight].into_iter().collect(),
            ..default()
        });
        run_behaviors(&mut world);
        let animator = world.get::<SpriteAnimator>(player);
        assert!(animator.is_some_and(|a| a.is_active(AnimationLabel::Run)));
        assert_eq!(animator.and_then(SpriteAnimator::atlas_index), Some(8));

        if let Some(mut animator) = world.get_mut::<SpriteAnimator>(player) {
            animator.advance(0.15);
        }
        run_behaviors(&mut world);

        let animator = world.get::<SpriteAnimator>(player);
        assert!(world.get::<CollisionState>(player).is_some_and(|s| s.below));
        assert!(animator.is_some_and(|a| a.is_active(AnimationLabel::Run)));
        assert_eq!(animator.and_then(SpriteAnimator::atlas_index), Some(9));
    }
}
