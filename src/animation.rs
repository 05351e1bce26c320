//! Frame-based sprite animation over texture atlas indices.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

/// Frames per second for clips that don't set their own rate.
pub const DEFAULT_FPS: f32 = 10.0;

/// Animation labels used by platformer characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AnimationLabel {
    Walk,
    Run,
    Idle,
    Attack,
    Death,
    Falling,
    Hurt,
    Jumping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Atlas indices, in play order
    pub frames: Vec<usize>,
    pub fps: f32,
    pub looping: bool,
}

impl AnimationClip {
    /// A looping clip over `count` consecutive atlas indices.
    pub fn row(start: usize, count: usize) -> Self {
        Self {
            frames: (start..start + count).collect(),
            fps: DEFAULT_FPS,
            looping: true,
        }
    }

    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }
}

/// Plays one clip at a time and exposes the current atlas index.
#[derive(Component, Debug, Clone, Default)]
pub struct SpriteAnimator {
    clips: HashMap<AnimationLabel, AnimationClip>,
    current: Option<AnimationLabel>,
    frame: usize,
    elapsed: f32,
    finished: bool,
    pub flip_x: bool,
}

impl SpriteAnimator {
    pub fn with_clip(mut self, label: AnimationLabel, clip: AnimationClip) -> Self {
        self.add_clip(label, clip);
        self
    }

    pub fn add_clip(&mut self, label: AnimationLabel, clip: AnimationClip) {
        self.clips.insert(label, clip);
    }

    /// Start `label` from its first frame. Unknown labels are ignored.
    pub fn play(&mut self, label: AnimationLabel) {
        if !self.clips.contains_key(&label) {
            warn!("No animation clip for {:?}", label);
            return;
        }
        self.current = Some(label);
        self.frame = 0;
        self.elapsed = 0.0;
        self.finished = false;
    }

    pub fn is_active(&self, label: AnimationLabel) -> bool {
        self.current == Some(label)
    }

    pub fn current(&self) -> Option<AnimationLabel> {
        self.current
    }

    /// A non-looping clip reached its last frame.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn advance(&mut self, dt: f32) {
        let Some(clip) = self.current.and_then(|label| self.clips.get(&label)) else {
            return;
        };
        if self.finished || clip.frames.len() <= 1 || clip.fps <= 0.0 {
            return;
        }

        self.elapsed += dt;
        let frame_time = 1.0 / clip.fps;
        while self.elapsed >= frame_time {
            self.elapsed -= frame_time;
            if self.frame + 1 < clip.frames.len() {
                self.frame += 1;
            } else if clip.looping {
                self.frame = 0;
            } else {
                self.finished = true;
                break;
            }
        }
    }

    /// Atlas index of the frame being shown.
    pub fn atlas_index(&self) -> Option<usize> {
        let clip = self.clips.get(&self.current?)?;
        clip.frames.get(self.frame).copied()
    }
}

/// Advances every animator and copies its frame and flip into the sprite.
pub fn animate_sprites(time: Res<Time>, mut query: Query<(&mut SpriteAnimator, &mut Sprite)>) {
    let dt = time.delta_secs();
    for (mut animator, mut sprite) in &mut query {
        animator.advance(dt);
        sprite.flip_x = animator.flip_x;
        if let Some(index) = animator.atlas_index()
            && let Some(atlas) = sprite.texture_atlas.as_mut()
        {
            atlas.index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> SpriteAnimator {
        SpriteAnimator::default()
            .with_clip(AnimationLabel::Run, AnimationClip::row(8, 3))
            .with_clip(AnimationLabel::Idle, AnimationClip::row(16, 1))
            .with_clip(AnimationLabel::Death, AnimationClip::row(40, 2).once())
    }

    #[test]
    fn test_play_and_loop() {
        let mut animator = animator();
        animator.play(AnimationLabel::Run);
        assert_eq!(animator.atlas_index(), Some(8));

        animator.advance(0.12);
        assert_eq!(animator.atlas_index(), Some(9));
        animator.advance(0.2);
        assert_eq!(animator.atlas_index(), Some(8));
    }

    #[test]
    fn test_play_restarts_clip() {
        let mut animator = animator();
        animator.play(AnimationLabel::Run);
        animator.advance(0.15);
        assert_eq!(animator.atlas_index(), Some(9));

        animator.play(AnimationLabel::Run);
        assert_eq!(animator.atlas_index(), Some(8));
    }

    #[test]
    fn test_once_clip_finishes_on_last_frame() {
        let mut animator = animator();
        animator.play(AnimationLabel::Death);
        animator.advance(1.0);
        assert!(animator.is_finished());
        assert_eq!(animator.atlas_index(), Some(41));
    }

    #[test]
    fn test_unknown_label_keeps_current() {
        let mut animator = animator();
        animator.play(AnimationLabel::Idle);
        animator.play(AnimationLabel::Hurt);
        assert!(animator.is_active(AnimationLabel::Idle));
    }
}
