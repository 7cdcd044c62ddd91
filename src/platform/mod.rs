//! Platform input mapping
//!
//! Browser key codes and pointer motion become a [`FrameInput`]. Held keys
//! persist across frames; pointer turn and the breath key are consumed by
//! the frame that reads them.

use crate::settings::Settings;
use crate::sim::tick::FrameInput;

/// What a physical key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Forward,
    Back,
    Left,
    Right,
    Run,
    SteadyBreath,
}

impl Binding {
    /// Map a `KeyboardEvent.code` value
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "KeyW" | "ArrowUp" => Binding::Forward,
            "KeyS" | "ArrowDown" => Binding::Back,
            "KeyA" => Binding::Left,
            "KeyD" => Binding::Right,
            "ShiftLeft" | "ShiftRight" => Binding::Run,
            "KeyE" => Binding::SteadyBreath,
            _ => return None,
        })
    }
}

/// Input accumulated between frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pending: FrameInput,
    shift_left: bool,
    shift_right: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is bound (callers prevent the default action)
    pub fn key_down(&mut self, code: &str) -> bool {
        self.set_key(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.set_key(code, false)
    }

    fn set_key(&mut self, code: &str, down: bool) -> bool {
        let Some(binding) = Binding::from_code(code) else {
            return false;
        };
        let movement = &mut self.pending.movement;
        match binding {
            Binding::Forward => movement.forward = down,
            Binding::Back => movement.back = down,
            Binding::Left => movement.left = down,
            Binding::Right => movement.right = down,
            Binding::Run => {
                // Either shift keeps running while the other is released
                if code == "ShiftLeft" {
                    self.shift_left = down;
                } else {
                    self.shift_right = down;
                }
                movement.run = self.shift_left || self.shift_right;
            }
            Binding::SteadyBreath => {
                if down {
                    self.pending.steady_breath = true;
                }
            }
        }
        true
    }

    /// Pointer motion in pixels; ignored unless the pointer is locked
    pub fn pointer_moved(&mut self, movement_x: f32, settings: &Settings) {
        if self.pending.look_locked && movement_x.is_finite() {
            self.pending.heading_delta += settings.turn_for(movement_x);
        }
    }

    pub fn set_look_locked(&mut self, locked: bool) {
        self.pending.look_locked = locked;
        if !locked {
            self.pending.heading_delta = 0.0;
        }
    }

    pub fn look_locked(&self) -> bool {
        self.pending.look_locked
    }

    /// Release every held key (focus lost)
    pub fn release_all(&mut self) {
        let look_locked = self.pending.look_locked;
        *self = Self::default();
        self.pending.look_locked = look_locked;
    }

    /// Input for the next frame; one-shot parts are cleared
    pub fn frame_input(&mut self) -> FrameInput {
        let input = self.pending;
        self.pending.heading_delta = 0.0;
        self.pending.steady_breath = false;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        assert_eq!(Binding::from_code("ArrowUp"), Some(Binding::Forward));
        assert_eq!(Binding::from_code("KeyE"), Some(Binding::SteadyBreath));
        assert_eq!(Binding::from_code("KeyQ"), None);
    }

    #[test]
    fn test_held_keys_persist() {
        let mut input = InputState::new();
        assert!(input.key_down("KeyW"));
        assert!(input.key_down("KeyA"));
        assert!(!input.key_down("Space"));
        assert!(input.frame_input().movement.forward);
        let second = input.frame_input();
        assert!(second.movement.forward && second.movement.left);
        input.key_up("KeyW");
        assert!(!input.frame_input().movement.forward);
    }

    #[test]
    fn test_both_shifts() {
        let mut input = InputState::new();
        input.key_down("ShiftLeft");
        input.key_down("ShiftRight");
        input.key_up("ShiftLeft");
        assert!(input.frame_input().movement.run);
        input.key_up("ShiftRight");
        assert!(!input.frame_input().movement.run);
    }

    #[test]
    fn test_breath_is_one_shot() {
        let mut input = InputState::new();
        input.key_down("KeyE");
        input.key_up("KeyE");
        assert!(input.frame_input().steady_breath);
        assert!(!input.frame_input().steady_breath);
    }

    #[test]
    fn test_pointer_turn_needs_lock() {
        let settings = Settings::default();
        let mut input = InputState::new();
        input.pointer_moved(100.0, &settings);
        assert_eq!(input.frame_input().heading_delta, 0.0);

        input.set_look_locked(true);
        input.pointer_moved(100.0, &settings);
        input.pointer_moved(-50.0, &settings);
        let frame = input.frame_input();
        assert!((frame.heading_delta - 50.0 * settings.mouse_sensitivity).abs() < 1e-6);
        assert!(frame.look_locked);
        assert_eq!(input.frame_input().heading_delta, 0.0);
    }

    #[test]
    fn test_release_all_keeps_lock() {
        let mut input = InputState::new();
        input.set_look_locked(true);
        input.key_down("KeyW");
        input.release_all();
        let frame = input.frame_input();
        assert!(!frame.movement.forward);
        assert!(frame.look_locked);
    }
}
