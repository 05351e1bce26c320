//! # fortloop
//!
//! Two small 2D scenes on top of the level crates: a Tiled platformer with
//! the Caveman, collectible items and danger zones, and an LDtk shooter with
//! a gun pickup and patrolling enemies.
//!
//! ## Architecture
//!
//! - **Layer 1** (`fortloop_assets`): Tiled and LDtk asset loading
//! - **Layer 2** (`fortloop_core`): level entity spawning and events
//! - **Layer 3** (this crate): sprites, tile collision, triggers, input,
//!   behaviors and the two scenes
//!
//! Gameplay runs in level space (Y down). [`physics::LevelPosition`] is the
//! source of truth for simulated bodies and is copied into `Transform` once
//! per frame.

pub mod animation;
pub mod behavior;
pub mod camera;
pub mod caveman;
pub mod combat;
pub mod config;
pub mod debug;
pub mod input;
pub mod physics;
pub mod platformer;
pub mod plugin;
pub mod render;
pub mod shooter;

// Re-export sub-crates for advanced usage
pub use fortloop_assets as assets;
pub use fortloop_core as core;

pub mod prelude {
    //! Common imports for game code.

    pub use crate::assets::prelude::*;
    pub use crate::core::prelude::*;

    pub use crate::animation::{AnimationClip, AnimationLabel, SpriteAnimator};
    pub use crate::behavior::{AttachBehaviorExt, Behavior, BehaviorContext, BehaviorRegistry};
    pub use crate::camera::CameraTarget;
    pub use crate::caveman::{Caveman, CavemanPlayer};
    pub use crate::combat::{Bullet, CombatRoster, Enemy};
    pub use crate::config::{CavemanTuning, CombatConfig, GameConfig, GameScene};
    pub use crate::debug::DebugToggles;
    pub use crate::input::{
        AxisHandle, AxisNode, ButtonHandle, ButtonNode, OverlapBehavior, VirtualInputs,
    };
    pub use crate::physics::{
        BoxCollider, CollisionState, HitTest, LevelCollision, LevelPosition, SolidGrid, Trigger,
        TriggerEntered, TriggerExited, TriggerShape, Velocity,
    };
    pub use crate::platformer::ItemsCollected;
    pub use crate::plugin::FortloopPlugin;
    pub use crate::shooter::{CurrentLevel, ShooterPlayer};
}

pub use plugin::FortloopPlugin;
