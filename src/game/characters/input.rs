// Per-tick character intents and the requested state they accumulate into

use glam::{Quat, Vec2, Vec3};

use crate::core::math;
use crate::engine::input::{Action, PlayerInput};

/// Crouch intent for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrouchInput {
    #[default]
    None,
    /// Flip the crouch request
    Toggle,
}

/// Raw intents handed to the character once per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterInput {
    /// Camera orientation; only its yaw matters for movement
    pub rotation: Quat,
    /// x is strafe (right positive), y is forward
    pub move_axis: Vec2,
    /// Jump pressed this tick
    pub jump: bool,
    /// Jump held
    pub jump_sustain: bool,
    pub crouch: CrouchInput,
    /// Snap the character's facing to the camera
    pub align_to_camera: bool,
}

impl Default for CharacterInput {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            move_axis: Vec2::ZERO,
            jump: false,
            jump_sustain: false,
            crouch: CrouchInput::None,
            align_to_camera: false,
        }
    }
}

impl CharacterInput {
    /// Build the tick's intents from action state and the camera pose
    ///
    /// In first person the character always faces the camera; in third person
    /// it does so while moving or aiming.
    pub fn from_actions(actions: &PlayerInput, camera_rotation: Quat, first_person: bool) -> Self {
        let move_axis = actions.move_axis();
        Self {
            rotation: camera_rotation,
            move_axis,
            jump: actions.just_pressed(Action::Jump),
            jump_sustain: actions.is_pressed(Action::Jump),
            crouch: if actions.just_pressed(Action::Crouch) {
                CrouchInput::Toggle
            } else {
                CrouchInput::None
            },
            align_to_camera: first_person
                || move_axis.length_squared() > 1.0e-4
                || actions.is_pressed(Action::Aim),
        }
    }
}

/// Intents latched across ticks until the motion solver consumes them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestedInput {
    pub rotation: Quat,
    /// World-space movement, at most unit length
    pub movement: Vec3,
    /// Latched until a jump executes or the buffer window runs out
    pub jump: bool,
    pub jump_sustain: bool,
    /// Toggled crouch state
    pub crouch: bool,
    /// Crouch was turned on while airborne
    pub crouch_in_air: bool,
    pub align_to_camera: bool,
}

impl Default for RequestedInput {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            movement: Vec3::ZERO,
            jump: false,
            jump_sustain: false,
            crouch: false,
            crouch_in_air: false,
            align_to_camera: false,
        }
    }
}

impl RequestedInput {
    /// Fold this tick's intents into the requested state
    ///
    /// Returns true when a new jump request was latched, so the caller can
    /// restart the jump buffer timer.
    pub fn merge(&mut self, input: &CharacterInput, grounded: bool) -> bool {
        self.rotation = input.rotation;
        let local = Vec3::new(input.move_axis.x, 0.0, input.move_axis.y);
        let yaw = math::yaw_only(input.rotation, Vec3::Y);
        self.movement = yaw * math::clamp_magnitude(local, 1.0);
        self.align_to_camera = input.align_to_camera;

        let was_requesting_jump = self.jump;
        self.jump |= input.jump;
        let new_jump = self.jump && !was_requesting_jump;

        self.jump_sustain = input.jump_sustain;

        let was_requesting_crouch = self.crouch;
        if input.crouch == CrouchInput::Toggle {
            self.crouch = !self.crouch;
        }
        if self.crouch && !was_requesting_crouch {
            self.crouch_in_air = !grounded;
        } else if !self.crouch && was_requesting_crouch {
            self.crouch_in_air = false;
        }

        new_jump
    }
}
