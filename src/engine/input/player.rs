// Per-player input state management

use super::action::Action;
use glam::Vec2;
use std::collections::HashSet;

/// Represents the input state for a single player
#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions that are currently pressed this frame
    pressed: HashSet<Action>,

    /// Actions that were just pressed this frame (press events)
    just_pressed: HashSet<Action>,
}

impl PlayerInput {
    /// Create a new player input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Register an action press
    pub fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release
    pub fn release(&mut self, action: Action) {
        self.pressed.remove(&action);
    }

    /// Update input state for a new frame
    /// Call this once per frame after the frame's input has been consumed
    pub fn update(&mut self) {
        // Clear frame-specific state
        self.just_pressed.clear();
    }

    /// Movement axis from the directional actions
    /// x is strafe (right positive), y is forward (forward positive)
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;

        if self.is_pressed(Action::MoveLeft) {
            axis.x -= 1.0;
        }
        if self.is_pressed(Action::MoveRight) {
            axis.x += 1.0;
        }
        if self.is_pressed(Action::MoveBack) {
            axis.y -= 1.0;
        }
        if self.is_pressed(Action::MoveForward) {
            axis.y += 1.0;
        }

        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_action() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        assert!(input.is_pressed(Action::Jump));
        assert!(input.just_pressed(Action::Jump));
    }

    #[test]
    fn test_repeated_press_is_not_a_new_edge() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        input.update();
        input.press(Action::Jump);
        assert!(input.is_pressed(Action::Jump));
        assert!(!input.just_pressed(Action::Jump));
    }

    #[test]
    fn test_release_action() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        input.update();
        input.release(Action::Jump);
        assert!(!input.is_pressed(Action::Jump));

        // Pressing again is a fresh edge
        input.update();
        input.press(Action::Jump);
        assert!(input.just_pressed(Action::Jump));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut input = PlayerInput::new();
        input.release(Action::Crouch);
        assert!(!input.is_pressed(Action::Crouch));
        assert_eq!(input.move_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_just_pressed_cleared_on_update() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        assert!(input.just_pressed(Action::Jump));

        input.update();
        assert!(input.is_pressed(Action::Jump));
        assert!(!input.just_pressed(Action::Jump));
    }

    #[test]
    fn test_move_axis() {
        let mut input = PlayerInput::new();
        assert_eq!(input.move_axis(), Vec2::ZERO);

        input.press(Action::MoveForward);
        input.press(Action::MoveRight);
        assert_eq!(input.move_axis(), Vec2::new(1.0, 1.0));

        // Opposite directions cancel
        input.press(Action::MoveLeft);
        assert_eq!(input.move_axis(), Vec2::new(0.0, 1.0));
    }
}
