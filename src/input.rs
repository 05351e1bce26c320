//! Virtual input: logical buttons and axes fed by keyboard and gamepad nodes.
//!
//! Inputs are registered in the [`VirtualInputs`] resource and addressed by
//! handle. Behaviors register theirs on attach and deregister on detach.

use bevy::input::gamepad::{Gamepad, GamepadButton};
use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;

/// Stick deflection below which the left stick reads as centred.
pub const DEFAULT_DEAD_ZONE: f32 = 0.1;

/// Device state sampled once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub keys: HashSet<KeyCode>,
    pub gamepad_buttons: HashSet<GamepadButton>,
    /// D-pad as an axis pair, each component in `[-1, 1]`
    pub dpad: Vec2,
    pub left_stick: Vec2,
}

impl InputSnapshot {
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn button_down(&self, button: GamepadButton) -> bool {
        self.gamepad_buttons.contains(&button)
    }
}

/// What a keyboard axis reports while both of its keys are held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapBehavior {
    /// Both held reads as zero
    #[default]
    CancelOut,
    /// The key pressed last wins
    TakeNewer,
    /// The key pressed first wins
    TakeOlder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonNode {
    Key(KeyCode),
    Gamepad(GamepadButton),
}

impl ButtonNode {
    fn is_down(&self, snapshot: &InputSnapshot) -> bool {
        match self {
            Self::Key(key) => snapshot.key_down(*key),
            Self::Gamepad(button) => snapshot.button_down(*button),
        }
    }
}

/// A logical button: down while any node is down.
#[derive(Debug, Clone, Default)]
pub struct VirtualButton {
    pub nodes: Vec<ButtonNode>,
    down: bool,
    was_down: bool,
}

impl VirtualButton {
    pub fn new(nodes: impl IntoIterator<Item = ButtonNode>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            ..default()
        }
    }

    pub fn update(&mut self, snapshot: &InputSnapshot) {
        self.was_down = self.down;
        self.down = self.nodes.iter().any(|node| node.is_down(snapshot));
    }

    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Went down this frame.
    pub fn is_pressed(&self) -> bool {
        self.down && !self.was_down
    }

    /// Went up this frame.
    pub fn is_released(&self) -> bool {
        !self.down && self.was_down
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisNode {
    /// D-pad left/right
    GamepadDpadLeftRight,
    /// Left stick X with a dead zone
    GamepadLeftStickX { dead_zone: f32 },
    /// Two keys with overlap handling
    KeyboardKeys {
        overlap: OverlapBehavior,
        negative: KeyCode,
        positive: KeyCode,
        value: f32,
        turned: bool,
    },
}

impl AxisNode {
    pub fn keyboard_keys(overlap: OverlapBehavior, negative: KeyCode, positive: KeyCode) -> Self {
        Self::KeyboardKeys {
            overlap,
            negative,
            positive,
            value: 0.0,
            turned: false,
        }
    }

    pub fn left_stick_x() -> Self {
        Self::GamepadLeftStickX {
            dead_zone: DEFAULT_DEAD_ZONE,
        }
    }

    fn update(&mut self, snapshot: &InputSnapshot) -> f32 {
        match self {
            Self::GamepadDpadLeftRight => {
                if snapshot.dpad.x < 0.0 {
                    -1.0
                } else if snapshot.dpad.x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::GamepadLeftStickX { dead_zone } => {
                let x = snapshot.left_stick.x;
                if x.abs() < *dead_zone { 0.0 } else { x }
            }
            Self::KeyboardKeys {
                overlap,
                negative,
                positive,
                value,
                turned,
            } => {
                let positive_down = snapshot.key_down(*positive);
                let negative_down = snapshot.key_down(*negative);
                if positive_down && negative_down {
                    match overlap {
                        OverlapBehavior::CancelOut => *value = 0.0,
                        OverlapBehavior::TakeNewer => {
                            if !*turned {
                                *value = -*value;
                                *turned = true;
                            }
                        }
                        OverlapBehavior::TakeOlder => {}
                    }
                } else {
                    *turned = false;
                    *value = if positive_down {
                        1.0
                    } else if negative_down {
                        -1.0
                    } else {
                        0.0
                    };
                }
                *value
            }
        }
    }
}

/// A logical axis reading -1, 0 or 1: the sign of the first node that is
/// not centred.
#[derive(Debug, Clone, Default)]
pub struct VirtualIntegerAxis {
    pub nodes: Vec<AxisNode>,
    value: i32,
}

impl VirtualIntegerAxis {
    pub fn new(nodes: impl IntoIterator<Item = AxisNode>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            value: 0,
        }
    }

    pub fn update(&mut self, snapshot: &InputSnapshot) {
        // Every node updates so keyboard overlap state stays current
        let values: Vec<f32> = self.nodes.iter_mut().map(|node| node.update(snapshot)).collect();
        self.value = values
            .into_iter()
            .find(|value| *value != 0.0)
            .map_or(0, |value| value.signum() as i32);
    }

    pub fn value(&self) -> i32 {
        self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonHandle(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisHandle(u32);

/// Registry of live virtual inputs, updated once per frame.
#[derive(Resource, Debug, Default)]
pub struct VirtualInputs {
    next_id: u32,
    buttons: HashMap<ButtonHandle, VirtualButton>,
    axes: HashMap<AxisHandle, VirtualIntegerAxis>,
}

impl VirtualInputs {
    pub fn register_button(&mut self, button: VirtualButton) -> ButtonHandle {
        let handle = ButtonHandle(self.allocate());
        self.buttons.insert(handle, button);
        handle
    }

    pub fn register_axis(&mut self, axis: VirtualIntegerAxis) -> AxisHandle {
        let handle = AxisHandle(self.allocate());
        self.axes.insert(handle, axis);
        handle
    }

    pub fn deregister_button(&mut self, handle: ButtonHandle) -> Option<VirtualButton> {
        self.buttons.remove(&handle)
    }

    pub fn deregister_axis(&mut self, handle: AxisHandle) -> Option<VirtualIntegerAxis> {
        self.axes.remove(&handle)
    }

    pub fn button(&self, handle: ButtonHandle) -> Option<&VirtualButton> {
        self.buttons.get(&handle)
    }

    /// Current axis value; 0 for unknown handles.
    pub fn axis(&self, handle: AxisHandle) -> i32 {
        self.axes.get(&handle).map_or(0, VirtualIntegerAxis::value)
    }

    pub fn is_pressed(&self, handle: ButtonHandle) -> bool {
        self.button(handle).is_some_and(VirtualButton::is_pressed)
    }

    /// Number of registered inputs.
    pub fn len(&self) -> usize {
        self.buttons.len() + self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn update(&mut self, snapshot: &InputSnapshot) {
        for button in self.buttons.values_mut() {
            button.update(snapshot);
        }
        for axis in self.axes.values_mut() {
            axis.update(snapshot);
        }
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

/// Samples the keyboard and the first connected gamepad into every
/// registered virtual input.
pub fn update_virtual_inputs(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut inputs: ResMut<VirtualInputs>,
) {
    let mut snapshot = InputSnapshot {
        keys: keyboard.get_pressed().copied().collect(),
        ..default()
    };
    if let Some(gamepad) = gamepads.iter().next() {
        snapshot.gamepad_buttons = gamepad.get_pressed().copied().collect();
        snapshot.dpad = gamepad.dpad();
        snapshot.left_stick = gamepad.left_stick();
    }
    inputs.update(&snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pressed: &[KeyCode]) -> InputSnapshot {
        InputSnapshot {
            keys: pressed.iter().copied().collect(),
            ..default()
        }
    }

    fn keyboard_axis(overlap: OverlapBehavior) -> VirtualIntegerAxis {
        VirtualIntegerAxis::new([AxisNode::keyboard_keys(
            overlap,
            KeyCode::ArrowLeft,
            KeyCode::ArrowRight,
        )])
    }

    #[test]
    fn test_take_newer_flips_to_the_second_key() {
        let mut axis = keyboard_axis(OverlapBehavior::TakeNewer);

        axis.update(&keys(&[KeyCode::ArrowRight]));
        assert_eq!(axis.value(), 1);

        axis.update(&keys(&[KeyCode::ArrowRight, KeyCode::ArrowLeft]));
        assert_eq!(axis.value(), -1);

        // Holding both keeps the newer direction instead of flipping every frame.
        axis.update(&keys(&[KeyCode::ArrowRight, KeyCode::ArrowLeft]));
        assert_eq!(axis.value(), -1);

        // Releasing the newer key falls back to the one still held.
        axis.update(&keys(&[KeyCode::ArrowRight]));
        assert_eq!(axis.value(), 1);

        axis.update(&keys(&[]));
        assert_eq!(axis.value(), 0);
    }

    #[test]
    fn test_cancel_out_and_take_older() {
        let mut cancel = keyboard_axis(OverlapBehavior::CancelOut);
        cancel.update(&keys(&[KeyCode::ArrowLeft]));
        cancel.update(&keys(&[KeyCode::ArrowLeft, KeyCode::ArrowRight]));
        assert_eq!(cancel.value(), 0);

        let mut older = keyboard_axis(OverlapBehavior::TakeOlder);
        older.update(&keys(&[KeyCode::ArrowLeft]));
        older.update(&keys(&[KeyCode::ArrowLeft, KeyCode::ArrowRight]));
        assert_eq!(older.value(), -1);
    }

    #[test]
    fn test_first_active_node_wins() {
        let mut axis = VirtualIntegerAxis::new([
            AxisNode::GamepadDpadLeftRight,
            AxisNode::left_stick_x(),
            AxisNode::keyboard_keys(
                OverlapBehavior::TakeNewer,
                KeyCode::ArrowLeft,
                KeyCode::ArrowRight,
            ),
        ]);

        let mut snapshot = keys(&[KeyCode::ArrowRight]);
        snapshot.left_stick = Vec2::new(-0.6, 0.0);
        axis.update(&snapshot);
        assert_eq!(axis.value(), -1);

        // Inside the dead zone the stick is ignored.
        snapshot.left_stick = Vec2::new(-0.05, 0.0);
        axis.update(&snapshot);
        assert_eq!(axis.value(), 1);

        snapshot.dpad = Vec2::new(-1.0, 0.0);
        axis.update(&snapshot);
        assert_eq!(axis.value(), -1);
    }

    #[test]
    fn test_button_edges() {
        let mut button = VirtualButton::new([
            ButtonNode::Key(KeyCode::KeyZ),
            ButtonNode::Gamepad(GamepadButton::South),
        ]);

        button.update(&keys(&[KeyCode::KeyZ]));
        assert!(button.is_pressed());
        assert!(button.is_down());

        button.update(&keys(&[KeyCode::KeyZ]));
        assert!(!button.is_pressed());
        assert!(button.is_down());

        let mut pad = InputSnapshot::default();
        pad.gamepad_buttons.insert(GamepadButton::South);
        button.update(&pad);
        assert!(button.is_down());
        assert!(!button.is_pressed());

        button.update(&InputSnapshot::default());
        assert!(button.is_released());
    }

    #[test]
    fn test_registry_handles() {
        let mut inputs = VirtualInputs::default();
        let jump = inputs.register_button(VirtualButton::new([ButtonNode::Key(KeyCode::KeyZ)]));
        let x = inputs.register_axis(keyboard_axis(OverlapBehavior::TakeNewer));
        assert_eq!(inputs.len(), 2);

        inputs.update(&keys(&[KeyCode::KeyZ, KeyCode::ArrowLeft]));
        assert!(inputs.is_pressed(jump));
        assert_eq!(inputs.axis(x), -1);

        assert!(inputs.deregister_button(jump).is_some());
        assert!(inputs.deregister_button(jump).is_none());
        assert!(inputs.deregister_axis(x).is_some());
        assert!(inputs.is_empty());
        assert_eq!(inputs.axis(x), 0);
    }
}
